use std::f64::consts::FRAC_1_SQRT_2;

use super::gaussian::Gaussian;
use super::lorentzian::Lorentzian;
use super::LineShape;
use crate::numerics::faddeeva::{faddeeva, Complex};
use crate::numerics::FRAC_1_SQRT_2PI;

/// A Gaussian narrower than this fraction of `γ` is treated as absent. Beyond it the
/// Faddeeva argument overflows on squaring.
const NEGLIGIBLE_GAUSSIAN: f64 = 1e-150;

#[derive(Clone, Copy, PartialEq, Debug)]
/// The convolution of a Gaussian (standard deviation `σ`) with a Lorentzian (half width at
/// half maximum `γ`), both centered on `μ`.
///
/// Either width may be zero, in which case the profile degenerates to the other component.
/// With both widths zero the profile is a delta spike, which evaluates to zero everywhere.
pub struct Voigt {
    pub μ: f64,
    pub σ: f64,
    pub γ: f64,
    pub normalize: f64,
}

impl Voigt {
    #[must_use]
    pub fn new(μ: f64, σ: f64, γ: f64) -> Self {
        Self {
            μ,
            σ,
            γ,
            normalize: 1.,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.σ == 0. && self.γ == 0.
    }

    #[must_use]
    /// Height of the profile at its center.
    pub fn peak(&self) -> f64 {
        self.evaluate(self.μ)
    }

    /// Whether the Gaussian and Lorentzian components are absent.
    fn missing_components(&self) -> (bool, bool) {
        (self.σ == 0. || self.σ < self.γ * NEGLIGIBLE_GAUSSIAN, self.γ == 0.)
    }

    fn gaussian(&self) -> Gaussian {
        Gaussian {
            μ: self.μ,
            σ: self.σ,
            normalize: self.normalize,
        }
    }

    fn lorentzian(&self) -> Lorentzian {
        Lorentzian {
            x0: self.μ,
            γ: self.γ,
            normalization: self.normalize,
        }
    }
}

impl LineShape for Voigt {
    fn μ(&self) -> f64 {
        self.μ
    }

    /// Olivero & Longbothum's approximation, good to about 0.02%.
    fn fwhm(&self) -> f64 {
        let f_g = self.σ * Gaussian::FWHM_FOR_σ;
        let f_l = 2. * self.γ;
        0.5346 * f_l + (0.2166 * f_l * f_l + f_g * f_g).sqrt()
    }

    fn evaluate(&self, x: f64) -> f64 {
        match self.missing_components() {
            (true, true) => 0.,
            (false, true) => self.gaussian().evaluate(x),
            (true, false) => self.lorentzian().evaluate(x),
            (false, false) => {
                let scale = FRAC_1_SQRT_2 / self.σ;
                let z = Complex::new((x - self.μ) * scale, self.γ * scale);
                self.normalize * FRAC_1_SQRT_2PI / self.σ * faddeeva(z).re
            }
        }
    }

    fn integral(&self, lo: f64, hi: f64) -> f64 {
        match self.missing_components() {
            (true, true) => 0.,
            (false, true) => self.gaussian().integral(lo, hi),
            (true, false) => self.lorentzian().integral(lo, hi),
            (false, false) => crate::numerics::simpson(
                |x| self.evaluate(x),
                lo,
                hi,
                crate::numerics::DEFAULT_SIMPSON_INTERVALS,
            ),
        }
    }
}
