use std::f64::consts::FRAC_1_SQRT_2;

use super::LineShape;
use crate::numerics::error_function::erfc;
use crate::numerics::FRAC_1_SQRT_2PI;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Gaussian {
    pub μ: f64,
    pub σ: f64,
    pub normalize: f64,
}

impl Gaussian {
    #[allow(non_upper_case_globals)]
    /// 2 sqrt(2 ln 2). <https://mathworld.wolfram.com/GaussianFunction.html>, eqn. 8.
    pub const FWHM_FOR_σ: f64 = 2.354_820_045_030_949;

    #[must_use]
    pub fn new(μ: f64, σ: f64) -> Self {
        Self {
            μ,
            σ,
            normalize: 1.,
        }
    }

    #[must_use]
    pub fn with_fwhm_normalized(μ: f64, fwhm: f64, normalize: f64) -> Self {
        Self {
            μ,
            σ: fwhm / Self::FWHM_FOR_σ,
            normalize,
        }
    }

    #[inline]
    #[must_use]
    pub fn evaluate_cdf(&self, x: f64) -> f64 {
        0.5 * erfc(-(x - self.μ) / self.σ * FRAC_1_SQRT_2) * self.normalize
    }
}

impl LineShape for Gaussian {
    fn μ(&self) -> f64 {
        self.μ
    }

    fn fwhm(&self) -> f64 {
        self.σ * Self::FWHM_FOR_σ
    }

    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        let σ_inv = self.σ.recip();
        self.normalize
            * FRAC_1_SQRT_2PI
            * σ_inv
            * (-0.5 * σ_inv * σ_inv * (x - self.μ) * (x - self.μ)).exp()
    }

    fn integral(&self, lo: f64, hi: f64) -> f64 {
        self.evaluate_cdf(hi) - self.evaluate_cdf(lo)
    }
}
