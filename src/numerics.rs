use std::ops::RangeInclusive;

use itertools::Itertools;

pub mod distribution;
pub mod error_function;
pub mod faddeeva;

pub const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
/// 2 / sqrt(π).
pub const FRAC_2_SQRT_PI: f64 = std::f64::consts::FRAC_2_SQRT_PI;

/// Interval count used when a shape has no closed-form integral.
pub const DEFAULT_SIMPSON_INTERVALS: usize = 2000;

/// `n` evenly spaced points spanning `range`, both ends included.
///
/// A single point collapses to the start of the range.
pub fn linspace(range: RangeInclusive<f64>, n: usize) -> impl Iterator<Item = f64> {
    let (lo, hi) = range.into_inner();
    #[allow(clippy::cast_precision_loss)]
    let step = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0. };
    (0..n).map(move |i| {
        // Pin the last point so that rounding never overshoots `hi`.
        if n > 1 && i == n - 1 {
            hi
        } else {
            #[allow(clippy::cast_precision_loss)]
            let offset = step * i as f64;
            lo + offset
        }
    })
}

#[must_use]
/// Composite Simpson's rule over `[lo, hi]` with `intervals` subintervals (rounded up to even).
///
/// Reversed bounds give the negated integral, and an empty interval integrates to zero.
pub fn simpson(f: impl Fn(f64) -> f64, lo: f64, hi: f64, intervals: usize) -> f64 {
    if lo == hi {
        return 0.;
    }
    let n = (intervals.max(2) + 1) & !1;
    let samples = linspace(lo..=hi, n + 1).map(f).collect_vec();
    #[allow(clippy::cast_precision_loss)]
    let h = (hi - lo) / n as f64;
    let interior: f64 = samples[1..n]
        .iter()
        .enumerate()
        .map(|(i, y)| if i % 2 == 0 { 4. * y } else { 2. * y })
        .sum();
    h / 3. * (samples[0] + interior + samples[n])
}
