use itertools::Itertools;

use crate::error::{Error, Result};

#[derive(Clone, PartialEq, Debug)]
/// A natural cubic spline through `(knots[i], values[i])`.
///
/// Outside of the knot range the spline is held at its end values rather than extrapolated.
pub struct Spline1D {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivatives at the knots; zero at both ends.
    curvature: Vec<f64>,
    /// Lower bound on the output. A cubic can undershoot between knots.
    floor: Option<f64>,
}

impl Spline1D {
    /// # Errors
    /// The knots must be finite and strictly increasing, at least two of them, with exactly
    /// one finite value per knot.
    pub fn new(name: &str, knots: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSpline {
            name: name.to_owned(),
            reason: reason.to_owned(),
        };
        if knots.len() != values.len() {
            return Err(invalid(&format!(
                "{} knots but {} values",
                knots.len(),
                values.len()
            )));
        }
        if knots.len() < 2 {
            return Err(invalid("at least two knots are needed"));
        }
        if !knots.iter().chain(&values).all(|v| v.is_finite()) {
            return Err(invalid("knots and values must be finite"));
        }
        if !knots.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(invalid("knots must be strictly increasing"));
        }
        let curvature = natural_curvature(&knots, &values);
        Ok(Self {
            knots,
            values,
            curvature,
            floor: None,
        })
    }

    /// Never return less than `floor`.
    #[must_use]
    pub fn with_floor(self, floor: f64) -> Self {
        Self {
            floor: Some(floor),
            ..self
        }
    }

    #[must_use]
    pub fn floor(&self) -> Option<f64> {
        self.floor
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let value = self.interpolate(x);
        match self.floor {
            Some(floor) => value.max(floor),
            None => value,
        }
    }

    fn interpolate(&self, x: f64) -> f64 {
        let last = self.knots.len() - 1;
        if x <= self.knots[0] {
            return self.values[0];
        }
        if x >= self.knots[last] {
            return self.values[last];
        }
        // First knot strictly above `x`; `x` is interior, so this lies in 1..=last.
        let hi = self.knots.partition_point(|&k| k <= x);
        let lo = hi - 1;
        let h = self.knots[hi] - self.knots[lo];
        let a = (self.knots[hi] - x) / h;
        let b = (x - self.knots[lo]) / h;
        a * self.values[lo]
            + b * self.values[hi]
            + ((a * a * a - a) * self.curvature[lo] + (b * b * b - b) * self.curvature[hi]) * h * h
                / 6.
    }
}

/// Solves the tridiagonal system for the knot second derivatives with both end derivatives
/// pinned to zero.
fn natural_curvature(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut y2 = vec![0.; n];
    let mut u = vec![0.; n];
    for i in 1..n - 1 {
        let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
        let p = sig * y2[i - 1] + 2.;
        y2[i] = (sig - 1.) / p;
        let slope_change =
            (y[i + 1] - y[i]) / (x[i + 1] - x[i]) - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
        u[i] = (6. * slope_change / (x[i + 1] - x[i - 1]) - sig * u[i - 1]) / p;
    }
    for k in (0..n - 1).rev() {
        y2[k] = y2[k] * y2[k + 1] + u[k];
    }
    y2
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::Spline1D;

    fn masses() -> Vec<f64> {
        vec![150., 250., 350., 450.]
    }

    #[test]
    fn interpolates_through_knots() {
        let spline = Spline1D::new("mean", masses(), vec![151., 249., 352., 447.]).unwrap();
        for (&m, &v) in spline.knots().iter().zip(spline.values()) {
            assert_abs_diff_eq!(spline.evaluate(m), v, epsilon = 1e-12);
        }
    }

    #[test]
    fn reproduces_linear_data() {
        let spline = Spline1D::new("sigma", masses(), vec![15., 25., 35., 45.]).unwrap();
        assert_abs_diff_eq!(spline.evaluate(200.), 20., epsilon = 1e-12);
        assert_abs_diff_eq!(spline.evaluate(333.), 33.3, epsilon = 1e-12);
    }

    #[test]
    fn natural_end_conditions() {
        // Symmetric data: the natural spline through (0,0),(1,1),(2,0) has y'' = -3 at the middle.
        let spline = Spline1D::new("bump", vec![0., 1., 2.], vec![0., 1., 0.]).unwrap();
        assert_abs_diff_eq!(spline.evaluate(0.5), 0.6875, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.evaluate(1.5), 0.6875, epsilon = 1e-12);
    }

    #[test]
    fn held_constant_outside_the_knots() {
        let spline = Spline1D::new("width", masses(), vec![1., 2., 4., 8.]).unwrap();
        assert_abs_diff_eq!(spline.evaluate(100.), 1.);
        assert_abs_diff_eq!(spline.evaluate(1000.), 8.);
    }

    #[test]
    fn floor_cuts_off_undershoot() {
        let knots = vec![100., 120., 140., 200.];
        let values = vec![0., 0., 0., 10.];
        let free = Spline1D::new("sigma1", knots.clone(), values.clone()).unwrap();
        assert_abs_diff_eq!(free.evaluate(125.), -0.065_524_193_548_387, epsilon = 1e-12);
        assert_abs_diff_eq!(free.evaluate(130.), -0.120_967_741_935_484, epsilon = 1e-12);

        let floored = Spline1D::new("sigma1", knots, values).unwrap().with_floor(0.);
        assert_eq!(floored.floor(), Some(0.));
        assert_abs_diff_eq!(floored.evaluate(125.), 0.);
        assert_abs_diff_eq!(floored.evaluate(130.), 0.);
        assert_abs_diff_eq!(floored.evaluate(170.), free.evaluate(170.));
        assert!(floored.evaluate(f64::NAN).is_nan());
    }

    #[test]
    fn rejects_malformed_knots() {
        assert!(Spline1D::new("s", vec![1., 2.], vec![1.]).is_err());
        assert!(Spline1D::new("s", vec![1.], vec![1.]).is_err());
        assert!(Spline1D::new("s", vec![2., 1.], vec![1., 1.]).is_err());
        assert!(Spline1D::new("s", vec![1., 1.], vec![1., 1.]).is_err());
        assert!(Spline1D::new("s", vec![1., f64::NAN], vec![1., 1.]).is_err());
    }
}
