use std::f64::consts::FRAC_1_PI;

use super::LineShape;

#[derive(Clone, Copy, Debug, PartialEq)]
/// The Cauchy distribution; `γ` is the half width at half maximum.
pub struct Lorentzian {
    pub x0: f64,
    pub γ: f64,
    pub normalization: f64,
}

impl Lorentzian {
    #[must_use]
    pub fn new(x0: f64, γ: f64) -> Self {
        Self {
            x0,
            γ,
            normalization: 1.,
        }
    }

    #[must_use]
    pub fn with_fwhm_normalized(μ: f64, fwhm: f64, normalization: f64) -> Self {
        Self {
            x0: μ,
            γ: fwhm / 2.,
            normalization,
        }
    }

    #[must_use]
    pub fn evaluate_cdf(&self, x: f64) -> f64 {
        (FRAC_1_PI * ((x - self.x0) / self.γ).atan() + 0.5) * self.normalization
    }
}

impl LineShape for Lorentzian {
    fn μ(&self) -> f64 {
        self.x0
    }

    fn fwhm(&self) -> f64 {
        self.γ * 2.
    }

    fn evaluate(&self, x: f64) -> f64 {
        let dx = x - self.x0;
        FRAC_1_PI * self.γ / (dx * dx + self.γ * self.γ) * self.normalization
    }

    fn integral(&self, lo: f64, hi: f64) -> f64 {
        self.evaluate_cdf(hi) - self.evaluate_cdf(lo)
    }
}
