use super::{simpson, DEFAULT_SIMPSON_INTERVALS};

pub mod gaussian;
pub mod lorentzian;
pub mod voigt;

/// A peaked line shape centered on `μ`, scaled to a fixed area over the whole real line.
pub trait LineShape {
    fn μ(&self) -> f64;
    fn fwhm(&self) -> f64;
    fn evaluate(&self, x: f64) -> f64;

    /// Area under the shape over `[lo, hi]`.
    fn integral(&self, lo: f64, hi: f64) -> f64 {
        simpson(|x| self.evaluate(x), lo, hi, DEFAULT_SIMPSON_INTERVALS)
    }
}
