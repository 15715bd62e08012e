use super::faddeeva::{faddeeva, Complex};
use super::FRAC_2_SQRT_PI;

/// Below this magnitude `erf` is summed directly instead of going through `1 - erfc`, which
/// would cancel catastrophically.
const SERIES_CUTOFF: f64 = 0.5;

#[must_use]
/// The complementary error function, via `erfc(x) = exp(-x²) w(ix)` for `x >= 0`.
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0. {
        return 2. - erfc(-x);
    }
    (-x * x).exp() * faddeeva(Complex::new(0., x)).re
}

#[must_use]
pub fn erf(x: f64) -> f64 {
    if x.abs() < SERIES_CUTOFF {
        return erf_series(x);
    }
    if x > 0. {
        1. - erfc(x)
    } else {
        erfc(-x) - 1.
    }
}

/// Maclaurin series `2/√π Σ (-1)ⁿ x^(2n+1) / (n! (2n+1))`.
fn erf_series(x: f64) -> f64 {
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1..30_u32 {
        term *= -x2 / f64::from(n);
        let contribution = term / f64::from(2 * n + 1);
        sum += contribution;
        if contribution.abs() < f64::EPSILON * sum.abs() {
            break;
        }
    }
    FRAC_2_SQRT_PI * sum
}
