//! The Faddeeva function `w(z) = exp(-z²) erfc(-iz)`.
//!
//! Evaluated with Gautschi's algorithm: a truncated Taylor expansion accelerated by a
//! Laplace continued fraction inside the rectangle `|x| < 5.33, |y| < 4.29`, and the bare
//! continued fraction outside of it. Good to about ten significant digits in the upper
//! half plane.

use std::ops::{Add, Mul, Neg, Sub};

use super::FRAC_2_SQRT_PI;

const X_LIM: f64 = 5.33;
const Y_LIM: f64 = 4.29;
/// Upper bound of `10 + 21 q` for `q <= 1`.
const MAX_FRACTION_DEPTH: usize = 31;
const OUTER_FRACTION_DEPTH: usize = 9;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[must_use]
    pub fn exp(self) -> Self {
        let modulus = self.re.exp();
        Self::new(modulus * self.im.cos(), modulus * self.im.sin())
    }

    #[must_use]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[must_use]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.re * factor, self.im * factor)
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

#[must_use]
pub fn faddeeva(z: Complex) -> Complex {
    if z.im < 0. {
        // w(z) = 2 exp(-z²) - w(-z), and -z lies in the upper half plane.
        return (-(z * z)).exp().scale(2.) - upper_half_plane(-z);
    }
    upper_half_plane(z)
}

/// `w(z)` for `Im z >= 0`.
fn upper_half_plane(z: Complex) -> Complex {
    let x = z.re.abs();
    let y = z.im;

    let mut w = if x < X_LIM && y < Y_LIM {
        accelerated_series(x, y)
    } else {
        continued_fraction(x, y)
    };
    if y == 0. {
        w.re = (-x * x).exp();
    }
    // w(-x + iy) = conj(w(x + iy)).
    if z.re < 0. {
        w = w.conj();
    }
    w
}

/// Both arguments are magnitudes inside the series rectangle.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn accelerated_series(x: f64, y: f64) -> Complex {
    let q = (1. - y / Y_LIM) * (1. - (x / X_LIM) * (x / X_LIM)).sqrt();
    let h = 1. / (3.2 * q);
    let terms = 7 + (23. * q) as usize;
    let depth = (10 + (21. * q) as usize).min(MAX_FRACTION_DEPTH);
    let shift = Complex::new(y + 0.5 / h, x);

    let mut r = [Complex::default(); MAX_FRACTION_DEPTH + 1];
    for n in (1..=depth).rev() {
        r[n - 1] = fraction_step(shift, r[n], n);
    }

    let mut λ = h.powi(1 - terms as i32);
    if λ == 0. {
        // Deep in the corner of the rectangle the series weight underflows; the
        // continued fraction alone is accurate there.
        return r[0].scale(FRAC_2_SQRT_PI);
    }
    let mut s = Complex::default();
    for n in (1..=terms).rev() {
        s = r[n - 1] * Complex::new(s.re + λ, s.im);
        λ *= h;
    }
    s.scale(FRAC_2_SQRT_PI)
}

fn continued_fraction(x: f64, y: f64) -> Complex {
    let shift = Complex::new(y, x);
    let r = (1..=OUTER_FRACTION_DEPTH)
        .rev()
        .fold(Complex::default(), |r, n| fraction_step(shift, r, n));
    r.scale(FRAC_2_SQRT_PI)
}

/// One level of `r_{n-1} = 1 / (2 (shift* + n r_n))`, written out on components.
#[inline]
#[allow(clippy::cast_precision_loss)]
fn fraction_step(shift: Complex, r: Complex, n: usize) -> Complex {
    let n = n as f64;
    let t = Complex::new(shift.re + n * r.re, shift.im - n * r.im);
    let t_norm = t.norm_sqr();
    Complex::new(0.5 * t.re / t_norm, 0.5 * t.im / t_norm)
}
