//! The single-sided shapes that model recipes build alongside the double-sided Voigtian.

use super::{sanitize, valid_width, Pdf, RealProxy};
use crate::numerics::distribution::gaussian::Gaussian;
use crate::numerics::distribution::lorentzian::Lorentzian;
use crate::numerics::distribution::voigt::Voigt;
use crate::numerics::distribution::LineShape;
use crate::workspace::{ParamId, Workspace};

/// Area-normalized Gaussian in `x`.
#[derive(Clone, Debug)]
pub struct GaussianPdf {
    name: String,
    title: String,
    x: RealProxy,
    mean: RealProxy,
    sigma: RealProxy,
}

impl GaussianPdf {
    pub const KIND: &'static str = "Gaussian";

    #[must_use]
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        x: ParamId,
        mean: ParamId,
        sigma: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x: RealProxy::new("x", x),
            mean: RealProxy::new("mean", mean),
            sigma: RealProxy::new("sigma", sigma),
        }
    }

    fn shape(&self, ws: &Workspace) -> Option<Gaussian> {
        let σ = self.sigma.value(ws);
        (valid_width(σ) && σ > 0.).then(|| Gaussian::new(self.mean.value(ws), σ))
    }
}

impl Pdf for GaussianPdf {
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
        vec![&self.x, &self.mean, &self.sigma]
    }

    fn evaluate_at(&self, ws: &Workspace, x: f64) -> f64 {
        let value = self.shape(ws).map_or(f64::NAN, |g| g.evaluate(x));
        sanitize(Self::KIND, value)
    }

    fn clone_named(&self, name: &str) -> Box<dyn Pdf> {
        Box::new(Self {
            name: name.to_owned(),
            ..self.clone()
        })
    }

    fn integral(&self, ws: &Workspace, lo: f64, hi: f64) -> f64 {
        self.shape(ws).map_or(0., |g| g.integral(lo, hi))
    }
}

/// Non-relativistic Breit-Wigner; `width` is the full width at half maximum.
#[derive(Clone, Debug)]
pub struct BreitWignerPdf {
    name: String,
    title: String,
    x: RealProxy,
    mean: RealProxy,
    width: RealProxy,
}

impl BreitWignerPdf {
    pub const KIND: &'static str = "BreitWigner";

    #[must_use]
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        x: ParamId,
        mean: ParamId,
        width: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x: RealProxy::new("x", x),
            mean: RealProxy::new("mean", mean),
            width: RealProxy::new("width", width),
        }
    }

    fn shape(&self, ws: &Workspace) -> Option<Lorentzian> {
        let width = self.width.value(ws);
        (valid_width(width) && width > 0.)
            .then(|| Lorentzian::with_fwhm_normalized(self.mean.value(ws), width, 1.))
    }
}

impl Pdf for BreitWignerPdf {
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
        vec![&self.x, &self.mean, &self.width]
    }

    fn evaluate_at(&self, ws: &Workspace, x: f64) -> f64 {
        let value = self.shape(ws).map_or(f64::NAN, |l| l.evaluate(x));
        sanitize(Self::KIND, value)
    }

    fn clone_named(&self, name: &str) -> Box<dyn Pdf> {
        Box::new(Self {
            name: name.to_owned(),
            ..self.clone()
        })
    }

    fn integral(&self, ws: &Workspace, lo: f64, hi: f64) -> f64 {
        self.shape(ws).map_or(0., |l| l.integral(lo, hi))
    }
}

/// Symmetric Voigt profile; `width` is the Lorentzian FWHM and `sigma` the Gaussian σ.
#[derive(Clone, Debug)]
pub struct VoigtianPdf {
    name: String,
    title: String,
    x: RealProxy,
    mean: RealProxy,
    width: RealProxy,
    sigma: RealProxy,
}

impl VoigtianPdf {
    pub const KIND: &'static str = "Voigtian";

    #[must_use]
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        x: ParamId,
        mean: ParamId,
        width: ParamId,
        sigma: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x: RealProxy::new("x", x),
            mean: RealProxy::new("mean", mean),
            width: RealProxy::new("width", width),
            sigma: RealProxy::new("sigma", sigma),
        }
    }

    fn shape(&self, ws: &Workspace) -> Option<Voigt> {
        let (width, σ) = (self.width.value(ws), self.sigma.value(ws));
        (valid_width(width) && valid_width(σ))
            .then(|| Voigt::new(self.mean.value(ws), σ, 0.5 * width))
    }
}

impl Pdf for VoigtianPdf {
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
        vec![&self.x, &self.mean, &self.width, &self.sigma]
    }

    fn evaluate_at(&self, ws: &Workspace, x: f64) -> f64 {
        let value = self.shape(ws).map_or(f64::NAN, |v| v.evaluate(x));
        sanitize(Self::KIND, value)
    }

    fn clone_named(&self, name: &str) -> Box<dyn Pdf> {
        Box::new(Self {
            name: name.to_owned(),
            ..self.clone()
        })
    }

    fn integral(&self, ws: &Workspace, lo: f64, hi: f64) -> f64 {
        self.shape(ws).map_or(0., |v| v.integral(lo, hi))
    }
}

/// `exp(c x)`.
#[derive(Clone, Debug)]
pub struct ExponentialPdf {
    name: String,
    title: String,
    x: RealProxy,
    c: RealProxy,
}

impl ExponentialPdf {
    pub const KIND: &'static str = "Exponential";

    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>, x: ParamId, c: ParamId) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x: RealProxy::new("x", x),
            c: RealProxy::new("c", c),
        }
    }
}

impl Pdf for ExponentialPdf {
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
        vec![&self.x, &self.c]
    }

    fn evaluate_at(&self, ws: &Workspace, x: f64) -> f64 {
        sanitize(Self::KIND, (self.c.value(ws) * x).exp())
    }

    fn clone_named(&self, name: &str) -> Box<dyn Pdf> {
        Box::new(Self {
            name: name.to_owned(),
            ..self.clone()
        })
    }

    fn integral(&self, ws: &Workspace, lo: f64, hi: f64) -> f64 {
        let c = self.c.value(ws);
        let value = if c == 0. {
            hi - lo
        } else {
            ((c * hi).exp() - (c * lo).exp()) / c
        };
        if value.is_finite() {
            value
        } else {
            0.
        }
    }
}
