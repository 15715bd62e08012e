use serde::{Deserialize, Serialize};

use super::{sanitize, valid_width, Pdf, RealProxy};
use crate::error::{Error, Result};
use crate::numerics::distribution::voigt::Voigt;
use crate::numerics::distribution::LineShape;
use crate::numerics::{simpson, DEFAULT_SIMPSON_INTERVALS};
use crate::workspace::{ParamId, Workspace};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How the fixed `y_max` of a [`DoubleSidedVoigtian`] enters its density.
pub enum YMaxRole {
    /// Both halves are rescaled to reach exactly `y_max` at the mean. This keeps the shape
    /// continuous whatever the two sides' widths are.
    #[default]
    PeakHeight,
    /// Each half is an area-normalized Voigt profile, cut off at `y_max`.
    Ceiling,
    /// Each half is an area-normalized Voigt profile and `y_max` is only carried along.
    Unused,
}

impl YMaxRole {
    /// Whether `y_max` is usable under this role.
    #[must_use]
    pub fn accepts(self, y_max: f64) -> bool {
        match self {
            YMaxRole::PeakHeight => y_max.is_finite() && y_max > 0.,
            YMaxRole::Ceiling | YMaxRole::Unused => y_max.is_finite() && y_max >= 0.,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// Workspace nodes a [`DoubleSidedVoigtian`] reads.
pub struct SideBindings {
    pub x: ParamId,
    pub mean: ParamId,
    /// Gaussian σ below the mean.
    pub sig1: ParamId,
    /// Gaussian σ at and above the mean.
    pub sig2: ParamId,
    /// Lorentzian FWHM below the mean.
    pub wid1: ParamId,
    /// Lorentzian FWHM at and above the mean.
    pub wid2: ParamId,
}

#[derive(Clone, Debug)]
/// A Voigt profile whose Gaussian σ and Lorentzian FWHM differ on either side of the mean.
///
/// Below the mean the shape uses `(sig1, wid1)`; at and above it, `(sig2, wid2)`. The
/// Lorentzian widths follow the Breit-Wigner convention of being full widths.
pub struct DoubleSidedVoigtian {
    name: String,
    title: String,
    x: RealProxy,
    mean: RealProxy,
    sig1: RealProxy,
    sig2: RealProxy,
    wid1: RealProxy,
    wid2: RealProxy,
    y_max: f64,
    y_max_role: YMaxRole,
}

impl DoubleSidedVoigtian {
    pub const KIND: &'static str = "DoubleSidedVoigtian";
    pub const CLASS_VERSION: u32 = 1;

    /// Bind a new shape with the default [`YMaxRole::PeakHeight`].
    ///
    /// # Errors
    /// [`Error::InvalidShape`] if `y_max` is unusable for the role, or if any width currently
    /// held by `ws` is negative or not finite.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        ws: &Workspace,
        bindings: SideBindings,
        y_max: f64,
    ) -> Result<Self> {
        Self::new_with_role(name, title, ws, bindings, y_max, YMaxRole::default())
    }

    /// # Errors
    /// See [`DoubleSidedVoigtian::new`].
    pub fn new_with_role(
        name: impl Into<String>,
        title: impl Into<String>,
        ws: &Workspace,
        bindings: SideBindings,
        y_max: f64,
        y_max_role: YMaxRole,
    ) -> Result<Self> {
        let shape = Self {
            name: name.into(),
            title: title.into(),
            x: RealProxy::new("x", bindings.x),
            mean: RealProxy::new("mean", bindings.mean),
            sig1: RealProxy::new("sig1", bindings.sig1),
            sig2: RealProxy::new("sig2", bindings.sig2),
            wid1: RealProxy::new("wid1", bindings.wid1),
            wid2: RealProxy::new("wid2", bindings.wid2),
            y_max,
            y_max_role,
        };
        shape.validate(ws)?;
        Ok(shape)
    }

    /// # Errors
    /// See [`DoubleSidedVoigtian::new`].
    pub fn with_y_max_role(mut self, role: YMaxRole, ws: &Workspace) -> Result<Self> {
        self.y_max_role = role;
        self.validate(ws)?;
        Ok(self)
    }

    #[must_use]
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    #[must_use]
    pub fn y_max_role(&self) -> YMaxRole {
        self.y_max_role
    }

    /// # Errors
    /// See [`DoubleSidedVoigtian::new`].
    pub fn validate(&self, ws: &Workspace) -> Result<()> {
        let invalid = |reason: String| Error::InvalidShape {
            name: self.name.clone(),
            reason,
        };
        if !self.y_max_role.accepts(self.y_max) {
            return Err(invalid(format!(
                "y_max = {} is not usable as {:?}",
                self.y_max, self.y_max_role
            )));
        }
        for proxy in [&self.sig1, &self.sig2, &self.wid1, &self.wid2] {
            let width = proxy.value(ws);
            if !valid_width(width) {
                return Err(invalid(format!(
                    "{} (`{}`) = {width} must be finite and non-negative",
                    proxy.role,
                    ws.name(proxy.id)
                )));
            }
        }
        Ok(())
    }

    /// `(σ, FWHM)` governing the density at `x`.
    fn side(&self, ws: &Workspace, x: f64, mean: f64) -> (f64, f64) {
        if x < mean {
            (self.sig1.value(ws), self.wid1.value(ws))
        } else {
            (self.sig2.value(ws), self.wid2.value(ws))
        }
    }

    /// Density of one half, `dx` away from the mean.
    fn half_density(&self, dx: f64, σ: f64, wid: f64) -> f64 {
        if !(dx.is_finite() && valid_width(σ) && valid_width(wid)) {
            return sanitize(Self::KIND, f64::NAN);
        }
        let profile = Voigt::new(0., σ, 0.5 * wid);
        let density = match self.y_max_role {
            YMaxRole::Unused => profile.evaluate(dx),
            YMaxRole::Ceiling => profile.evaluate(dx).min(self.y_max),
            YMaxRole::PeakHeight if profile.is_degenerate() => {
                if dx == 0. {
                    self.y_max
                } else {
                    0.
                }
            }
            YMaxRole::PeakHeight => self.y_max * profile.evaluate(dx) / profile.peak(),
        };
        sanitize(Self::KIND, density)
    }
}

impl Pdf for DoubleSidedVoigtian {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn observable(&self) -> &RealProxy {
        &self.x
    }

    fn proxies(&self) -> Vec<&RealProxy> {
        vec![
            &self.x, &self.mean, &self.sig1, &self.sig2, &self.wid1, &self.wid2,
        ]
    }

    fn evaluate_at(&self, ws: &Workspace, x: f64) -> f64 {
        let mean = self.mean.value(ws);
        let (σ, wid) = self.side(ws, x, mean);
        self.half_density(x - mean, σ, wid)
    }

    fn clone_named(&self, name: &str) -> Box<dyn Pdf> {
        Box::new(Self {
            name: name.to_owned(),
            ..self.clone()
        })
    }

    /// Integrates each half separately so that a jump at the mean costs no accuracy.
    fn integral(&self, ws: &Workspace, lo: f64, hi: f64) -> f64 {
        if lo.is_nan() || hi.is_nan() {
            return 0.;
        }
        if hi < lo {
            return -self.integral(ws, hi, lo);
        }
        let mean = self.mean.value(ws);
        let (sig1, wid1) = (self.sig1.value(ws), self.wid1.value(ws));
        let (sig2, wid2) = (self.sig2.value(ws), self.wid2.value(ws));
        let split = mean.clamp(lo, hi);
        let half = |σ: f64, wid: f64, from: f64, to: f64| {
            // A side with both widths zero is a point mass at the mean and has no area.
            if σ == 0. && wid == 0. {
                return 0.;
            }
            simpson(
                |x| self.half_density(x - mean, σ, wid),
                from,
                to,
                DEFAULT_SIMPSON_INTERVALS,
            )
        };
        let left = half(sig1, wid1, lo, split);
        let right = half(sig2, wid2, split, hi);
        sanitize(Self::KIND, left + right)
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    use super::{DoubleSidedVoigtian, SideBindings, YMaxRole};
    use crate::error::Error;
    use crate::numerics::distribution::gaussian::Gaussian;
    use crate::numerics::distribution::lorentzian::Lorentzian;
    use crate::numerics::distribution::voigt::Voigt;
    use crate::numerics::distribution::LineShape;
    use crate::numerics::FRAC_1_SQRT_2PI;
    use crate::pdf::Pdf;
    use crate::workspace::Workspace;

    struct Fixture {
        ws: Workspace,
        bindings: SideBindings,
    }

    fn fixture(mean: f64, sig: (f64, f64), wid: (f64, f64)) -> Fixture {
        let mut ws = Workspace::new();
        let bindings = SideBindings {
            x: ws.add_variable("x", mean, -50., 50.).unwrap(),
            mean: ws.add_variable("mean", mean, -10., 10.).unwrap(),
            sig1: ws.add_variable("sig1", sig.0, 0., 20.).unwrap(),
            sig2: ws.add_variable("sig2", sig.1, 0., 20.).unwrap(),
            wid1: ws.add_variable("wid1", wid.0, 0., 20.).unwrap(),
            wid2: ws.add_variable("wid2", wid.1, 0., 20.).unwrap(),
        };
        Fixture { ws, bindings }
    }

    fn shape(f: &Fixture, y_max: f64, role: YMaxRole) -> DoubleSidedVoigtian {
        DoubleSidedVoigtian::new("dsv", "double-sided Voigtian", &f.ws, f.bindings, y_max)
            .unwrap()
            .with_y_max_role(role, &f.ws)
            .unwrap()
    }

    #[test]
    fn standard_normal_peak() {
        let f = fixture(0., (1., 1.), (0., 0.));
        let raw = shape(&f, 1., YMaxRole::Unused);
        assert_abs_diff_eq!(raw.evaluate_at(&f.ws, 0.), FRAC_1_SQRT_2PI, epsilon = 1e-16);
        let scaled = shape(&f, FRAC_1_SQRT_2PI, YMaxRole::PeakHeight);
        assert_abs_diff_eq!(scaled.evaluate(&f.ws), FRAC_1_SQRT_2PI, epsilon = 1e-16);
        for x in [0.1, 0.5, 1., 2.5, 7.] {
            assert_eq!(raw.evaluate_at(&f.ws, x), raw.evaluate_at(&f.ws, -x));
            assert_eq!(scaled.evaluate_at(&f.ws, x), scaled.evaluate_at(&f.ws, -x));
        }
    }

    #[test]
    fn sides_use_their_own_widths() {
        let f = fixture(1., (0.5, 2.), (0.2, 1.));
        let dsv = shape(&f, 1., YMaxRole::Unused);
        let left = Voigt::new(1., 0.5, 0.1);
        let right = Voigt::new(1., 2., 0.5);
        assert_relative_eq!(dsv.evaluate_at(&f.ws, 0.3), left.evaluate(0.3));
        assert_relative_eq!(dsv.evaluate_at(&f.ws, 1.7), right.evaluate(1.7));
        // The mean itself belongs to the upper side.
        assert_relative_eq!(dsv.evaluate_at(&f.ws, 1.), right.peak());
    }

    #[test]
    fn peak_height_is_continuous_at_the_mean() {
        let f = fixture(0., (0.3, 1.7), (0.9, 0.1));
        let dsv = shape(&f, 2.5, YMaxRole::PeakHeight);
        assert_abs_diff_eq!(dsv.evaluate_at(&f.ws, 0.), 2.5);
        assert_relative_eq!(dsv.evaluate_at(&f.ws, -1e-9), 2.5, max_relative = 1e-6);
        assert_relative_eq!(dsv.evaluate_at(&f.ws, 1e-9), 2.5, max_relative = 1e-6);
        assert_eq!(dsv.evaluate_at(&f.ws, -0.), dsv.evaluate_at(&f.ws, 0.));
    }

    #[test]
    fn unscaled_sides_jump_by_a_bounded_amount() {
        let f = fixture(0., (0.3, 1.7), (0.9, 0.1));
        let dsv = shape(&f, 1., YMaxRole::Unused);
        let below = dsv.evaluate_at(&f.ws, -1e-12);
        let above = dsv.evaluate_at(&f.ws, 0.);
        assert!(below.is_finite() && above.is_finite());
        assert!((below - above).abs() > 0.1);
    }

    #[test]
    fn symmetric_widths_reduce_to_a_voigt_profile() {
        let f = fixture(0.5, (0.8, 0.8), (0.6, 0.6));
        let dsv = shape(&f, 3., YMaxRole::PeakHeight);
        let reference = Voigt::new(0.5, 0.8, 0.3);
        let ratio = 3. / reference.peak();
        for x in [-4., -1., 0., 0.5, 1.3, 6.] {
            assert_relative_eq!(
                dsv.evaluate_at(&f.ws, x),
                ratio * reference.evaluate(x),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn degenerate_limits() {
        let gaussian = fixture(0., (1., 2.), (1e-9, 1e-9));
        let dsv = shape(&gaussian, 1., YMaxRole::Unused);
        assert_relative_eq!(
            dsv.evaluate_at(&gaussian.ws, -0.7),
            Gaussian::new(0., 1.).evaluate(-0.7),
            max_relative = 1e-6
        );
        assert_relative_eq!(
            dsv.evaluate_at(&gaussian.ws, 0.7),
            Gaussian::new(0., 2.).evaluate(0.7),
            max_relative = 1e-6
        );

        let lorentzian = fixture(0., (0., 0.), (1., 3.));
        let dsv = shape(&lorentzian, 1., YMaxRole::Unused);
        assert_relative_eq!(
            dsv.evaluate_at(&lorentzian.ws, -0.7),
            Lorentzian::with_fwhm_normalized(0., 1., 1.).evaluate(-0.7)
        );
        assert_relative_eq!(
            dsv.evaluate_at(&lorentzian.ws, 0.7),
            Lorentzian::with_fwhm_normalized(0., 3., 1.).evaluate(0.7)
        );

        let spike = fixture(0., (0., 0.), (0., 0.));
        let dsv = shape(&spike, 4., YMaxRole::PeakHeight);
        assert_abs_diff_eq!(dsv.evaluate_at(&spike.ws, 0.), 4.);
        assert_abs_diff_eq!(dsv.evaluate_at(&spike.ws, 0.1), 0.);
    }

    #[test]
    fn ceiling_clips_the_peak() {
        let f = fixture(0., (0.1, 0.1), (0., 0.));
        let dsv = shape(&f, 1., YMaxRole::Ceiling);
        assert_abs_diff_eq!(dsv.evaluate_at(&f.ws, 0.), 1.);
        let tail = Gaussian::new(0., 0.1).evaluate(0.4);
        assert_abs_diff_eq!(dsv.evaluate_at(&f.ws, 0.4), tail);
    }

    #[test]
    fn rejects_unusable_construction() {
        let f = fixture(0., (1., 1.), (1., 1.));
        let build = |y_max| DoubleSidedVoigtian::new("dsv", "", &f.ws, f.bindings, y_max);
        assert!(matches!(build(0.), Err(Error::InvalidShape { .. })));
        assert!(matches!(build(f64::INFINITY), Err(Error::InvalidShape { .. })));
        assert!(build(1.)
            .unwrap()
            .with_y_max_role(YMaxRole::Unused, &f.ws)
            .is_ok());

        let mut ws = Workspace::new();
        let bindings = SideBindings {
            x: ws.add_variable("x", 0., -1., 1.).unwrap(),
            mean: ws.add_constant("mean", 0.).unwrap(),
            sig1: ws.add_constant("sig1", -1.).unwrap(),
            sig2: ws.add_constant("sig2", 1.).unwrap(),
            wid1: ws.add_constant("wid1", 1.).unwrap(),
            wid2: ws.add_constant("wid2", 1.).unwrap(),
        };
        assert!(matches!(
            DoubleSidedVoigtian::new("dsv", "", &ws, bindings, 1.),
            Err(Error::InvalidShape { .. })
        ));
    }

    #[test]
    fn unusable_parameters_evaluate_to_zero() {
        let mut ws = Workspace::new();
        let bindings = SideBindings {
            x: ws.add_variable("x", 0., -10., 10.).unwrap(),
            mean: ws.add_constant("mean", 0.).unwrap(),
            sig1: ws.add_variable("sig1", 1., -5., 5.).unwrap(),
            sig2: ws.add_constant("sig2", 1.).unwrap(),
            wid1: ws.add_constant("wid1", 1.).unwrap(),
            wid2: ws.add_constant("wid2", 1.).unwrap(),
        };
        let dsv = DoubleSidedVoigtian::new("dsv", "", &ws, bindings, 1.).unwrap();
        // A fitter wandering into negative widths only zeroes the affected side.
        ws.set_value(bindings.sig1, -1.).unwrap();
        assert_abs_diff_eq!(dsv.evaluate_at(&ws, -1.), 0.);
        assert!(dsv.evaluate_at(&ws, 1.) > 0.);
        assert!(dsv.validate(&ws).is_err());

        assert_abs_diff_eq!(dsv.evaluate_at(&ws, f64::NAN), 0.);
        assert_abs_diff_eq!(dsv.evaluate_at(&ws, f64::INFINITY), 0.);
        assert_abs_diff_eq!(dsv.evaluate_at(&ws, f64::NEG_INFINITY), 0.);
    }

    #[test]
    fn clone_shares_bindings() {
        let mut f = fixture(0., (1., 1.), (0.5, 0.5));
        let original = shape(&f, 1., YMaxRole::Unused);
        let copy = original.clone_named("dsv_copy");
        assert_eq!(copy.name(), "dsv_copy");
        assert_eq!(copy.kind(), DoubleSidedVoigtian::KIND);
        assert_eq!(original.name(), "dsv");

        f.ws.set_value(f.bindings.mean, 2.).unwrap();
        f.ws.set_value(f.bindings.x, 1.).unwrap();
        assert_eq!(copy.evaluate(&f.ws), original.evaluate(&f.ws));
        assert!(copy.depends_on(f.bindings.wid2));
        assert_eq!(f.ws.len(), 6);
    }

    #[test]
    fn integral_and_normalization() {
        let f = fixture(0., (1., 2.), (0., 0.));
        let dsv = shape(&f, 1., YMaxRole::PeakHeight);
        // Two half Gaussians of height one: sqrt(π/2) (σ1 + σ2).
        let expected = (std::f64::consts::PI / 2.).sqrt() * 3.;
        assert_relative_eq!(dsv.integral(&f.ws, -50., 50.), expected, max_relative = 1e-9);
        assert_relative_eq!(
            dsv.integral(&f.ws, 50., -50.),
            -expected,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            dsv.normalized(&f.ws).unwrap(),
            1. / expected,
            max_relative = 1e-9
        );
    }

    #[test]
    fn point_mass_sides_have_no_area() {
        let spike = fixture(0., (0., 0.), (0., 0.));
        let dsv = shape(&spike, 3., YMaxRole::PeakHeight);
        assert_abs_diff_eq!(dsv.evaluate(&spike.ws), 3.);
        assert_abs_diff_eq!(dsv.integral(&spike.ws, -1., 1.), 0.);
        assert!(matches!(
            dsv.normalized(&spike.ws),
            Err(Error::ZeroIntegral { .. })
        ));

        // Only the Gaussian lower half contributes.
        let half = fixture(0., (1., 0.), (0., 0.));
        let dsv = shape(&half, 1., YMaxRole::PeakHeight);
        assert_relative_eq!(
            dsv.integral(&half.ws, -50., 50.),
            std::f64::consts::FRAC_PI_2.sqrt(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn ceiling_accepts_a_zero_y_max() {
        let f = fixture(0., (1., 1.), (1., 1.));
        let dsv =
            DoubleSidedVoigtian::new_with_role("dsv", "", &f.ws, f.bindings, 0., YMaxRole::Ceiling)
                .unwrap();
        assert_abs_diff_eq!(dsv.evaluate(&f.ws), 0.);
        assert!(YMaxRole::Unused.accepts(0.));
        assert!(!YMaxRole::PeakHeight.accepts(0.));
        assert!(!YMaxRole::Ceiling.accepts(f64::NAN));
    }

    #[test]
    fn summary_names_the_bindings() {
        let f = fixture(0., (1., 1.), (1., 1.));
        let summary = shape(&f, 1., YMaxRole::PeakHeight).summary(&f.ws);
        assert_eq!(summary.kind, "DoubleSidedVoigtian");
        assert_eq!(summary.bindings["wid1"], "wid1");
        assert_eq!(summary.bindings.len(), 6);
    }

    proptest! {
        #[test]
        fn finite_and_non_negative(
            x in -100.0..100.0_f64,
            mean in -10.0..10.0_f64,
            sig1 in 0.0..20.0_f64,
            sig2 in 0.0..20.0_f64,
            wid1 in 0.0..20.0_f64,
            wid2 in 0.0..20.0_f64,
            role in prop_oneof![
                Just(YMaxRole::PeakHeight),
                Just(YMaxRole::Ceiling),
                Just(YMaxRole::Unused),
            ],
        ) {
            let f = fixture(mean, (sig1, sig2), (wid1, wid2));
            let dsv = shape(&f, 1.5, role);
            let value = dsv.evaluate_at(&f.ws, x);
            prop_assert!(value.is_finite());
            prop_assert!(value >= 0.);
            prop_assert_eq!(value.to_bits(), dsv.evaluate_at(&f.ws, x).to_bits());
        }

        #[test]
        fn peak_height_never_exceeds_y_max(
            dx in -30.0..30.0_f64,
            sig1 in 0.01..5.0_f64,
            sig2 in 0.01..5.0_f64,
            wid1 in 0.0..5.0_f64,
            wid2 in 0.0..5.0_f64,
        ) {
            let f = fixture(0., (sig1, sig2), (wid1, wid2));
            let dsv = shape(&f, 2., YMaxRole::PeakHeight);
            prop_assert!(dsv.evaluate_at(&f.ws, dx) <= 2. * (1. + 1e-12));
        }

        #[test]
        fn continuous_at_the_mean(
            mean in -10.0..10.0_f64,
            sig1 in 0.01..5.0_f64,
            sig2 in 0.01..5.0_f64,
            wid1 in 0.0..5.0_f64,
            wid2 in 0.0..5.0_f64,
            y_max in 0.1..10.0_f64,
        ) {
            let f = fixture(mean, (sig1, sig2), (wid1, wid2));
            let ε = 1e-9 * (1. + mean.abs());

            let scaled = shape(&f, y_max, YMaxRole::PeakHeight);
            prop_assert!((scaled.evaluate_at(&f.ws, mean) - y_max).abs() <= 1e-14 * y_max);
            let below = scaled.evaluate_at(&f.ws, mean - ε);
            let above = scaled.evaluate_at(&f.ws, mean + ε);
            prop_assert!((below - y_max).abs() <= 1e-6 * y_max);
            prop_assert!((above - y_max).abs() <= 1e-6 * y_max);

            let raw = shape(&f, y_max, YMaxRole::Unused);
            let jump = raw.evaluate_at(&f.ws, mean) - raw.evaluate_at(&f.ws, mean - ε);
            prop_assert!(jump.is_finite());
        }
    }
}
