//! Numeric coefficients of symbolic expressions
//!
//! Coefficients are exact rationals whenever possible. Arithmetic that would
//! overflow `i64`, or that involves a float operand, falls back to `f64`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Integer k-th root of `n >= 0`, if `n` is a perfect k-th power.
fn exact_root(n: i64, k: u32) -> Option<i64> {
    if n < 0 || k == 0 {
        return None;
    }
    if n < 2 || k == 1 {
        return Some(n);
    }
    let guess = (n as f64).powf(1.0 / k as f64).round() as i64;
    (guess.saturating_sub(1)..=guess.saturating_add(1))
        .filter(|r| *r >= 0)
        .find(|r| r.checked_pow(k) == Some(n))
}

/// A numeric coefficient in a symbolic expression
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Coefficient {
    /// Exact rational number (numerator, denominator)
    /// Invariant: denominator > 0, gcd(num, den) == 1
    Rational(i64, i64),
    /// Floating-point value
    Float(f64),
}

impl Coefficient {
    pub fn int(n: i64) -> Self {
        Coefficient::Rational(n, 1)
    }

    /// Build a reduced rational. A zero denominator yields a signed infinity.
    pub fn rational(num: i64, den: i64) -> Self {
        Self::from_i128(num as i128, den as i128)
    }

    fn from_i128(num: i128, den: i128) -> Self {
        if den == 0 {
            return Coefficient::Float(match num.cmp(&0) {
                Ordering::Less => f64::NEG_INFINITY,
                Ordering::Greater => f64::INFINITY,
                Ordering::Equal => f64::NAN,
            });
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num, den).max(1);
        let (num, den) = (num / g, den / g);
        match (i64::try_from(num), i64::try_from(den)) {
            (Ok(n), Ok(d)) => Coefficient::Rational(n, d),
            _ => Coefficient::Float(num as f64 / den as f64),
        }
    }

    pub fn float(f: f64) -> Self {
        Coefficient::Float(f)
    }

    /// Integral finite floats become exact integers; everything else stays a float.
    pub fn from_f64_exact(f: f64) -> Self {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Coefficient::int(f as i64)
        } else {
            Coefficient::Float(f)
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Coefficient::Rational(n, _) => *n == 0,
            Coefficient::Float(f) => *f == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Coefficient::Rational(n, d) => *n == 1 && *d == 1,
            Coefficient::Float(f) => *f == 1.0,
        }
    }

    pub fn is_neg_one(&self) -> bool {
        match self {
            Coefficient::Rational(n, d) => *n == -1 && *d == 1,
            Coefficient::Float(f) => *f == -1.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Coefficient::Rational(n, _) => *n < 0,
            Coefficient::Float(f) => *f < 0.0,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Coefficient::Float(_))
    }

    /// Exact integers only; integral floats do not count.
    pub fn is_integer(&self) -> bool {
        matches!(self, Coefficient::Rational(_, 1))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Coefficient::Rational(n, 1) => Some(*n),
            _ => None,
        }
    }

    pub fn numer(&self) -> Option<i64> {
        match self {
            Coefficient::Rational(n, _) => Some(*n),
            Coefficient::Float(_) => None,
        }
    }

    pub fn denom(&self) -> Option<i64> {
        match self {
            Coefficient::Rational(_, d) => Some(*d),
            Coefficient::Float(_) => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Coefficient::Rational(n, d) => *n as f64 / *d as f64,
            Coefficient::Float(f) => *f,
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            Coefficient::Rational(n, d) => Coefficient::Rational(n.abs(), *d),
            Coefficient::Float(f) => Coefficient::Float(f.abs()),
        }
    }

    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(Coefficient::int(1) / *self)
    }

    /// Integer power. `None` for a negative power of zero.
    pub fn pow_int(&self, exp: i64) -> Option<Self> {
        if exp < 0 {
            return self.recip()?.pow_int(-exp);
        }
        match self {
            Coefficient::Rational(n, d) => {
                let e = u32::try_from(exp).ok();
                match e.and_then(|e| Some((n.checked_pow(e)?, d.checked_pow(e)?))) {
                    Some((pn, pd)) => Some(Coefficient::Rational(pn, pd)),
                    None => Some(Coefficient::Float(self.to_f64().powf(exp as f64))),
                }
            }
            Coefficient::Float(f) => Some(Coefficient::Float(f.powf(exp as f64))),
        }
    }

    /// Power with a coefficient exponent, when the result is representable.
    ///
    /// Rational exponents only evaluate for perfect roots, so `4^(1/2)` is `2`
    /// while `2^(1/2)` stays symbolic (`None`).
    pub fn pow(&self, exp: &Coefficient) -> Option<Self> {
        if let Some(n) = exp.as_integer() {
            return self.pow_int(n);
        }
        match (self, exp) {
            (Coefficient::Rational(n, d), Coefficient::Rational(p, q)) => {
                let k = u32::try_from(*q).ok()?;
                let root = Coefficient::Rational(exact_root(*n, k)?, exact_root(*d, k)?);
                root.pow_int(*p)
            }
            _ => {
                let base = self.to_f64();
                if base < 0.0 {
                    return None;
                }
                Some(Coefficient::Float(base.powf(exp.to_f64())))
            }
        }
    }

    fn normalized_bits(f: f64) -> u64 {
        if f == 0.0 {
            0.0f64.to_bits()
        } else if f.is_nan() {
            f64::NAN.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl PartialEq for Coefficient {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Coefficient::Rational(n1, d1), Coefficient::Rational(n2, d2)) => n1 == n2 && d1 == d2,
            (Coefficient::Float(a), Coefficient::Float(b)) => {
                Self::normalized_bits(*a) == Self::normalized_bits(*b)
            }
            _ => false,
        }
    }
}

impl Eq for Coefficient {}

impl Hash for Coefficient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Coefficient::Rational(n, d) => {
                state.write_u8(0);
                n.hash(state);
                d.hash(state);
            }
            Coefficient::Float(f) => {
                state.write_u8(1);
                Self::normalized_bits(*f).hash(state);
            }
        }
    }
}

impl PartialOrd for Coefficient {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coefficient {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Coefficient::Rational(n1, d1), Coefficient::Rational(n2, d2)) => {
                (*n1 as i128 * *d2 as i128).cmp(&(*n2 as i128 * *d1 as i128))
            }
            (Coefficient::Float(a), Coefficient::Float(b)) => {
                let a = f64::from_bits(Self::normalized_bits(*a));
                a.total_cmp(&f64::from_bits(Self::normalized_bits(*b)))
            }
            (Coefficient::Rational(..), Coefficient::Float(_)) => self
                .to_f64()
                .total_cmp(&other.to_f64())
                .then(Ordering::Less),
            (Coefficient::Float(_), Coefficient::Rational(..)) => self
                .to_f64()
                .total_cmp(&other.to_f64())
                .then(Ordering::Greater),
        }
    }
}

impl Default for Coefficient {
    fn default() -> Self {
        Coefficient::int(0)
    }
}

impl From<i64> for Coefficient {
    fn from(n: i64) -> Self {
        Coefficient::int(n)
    }
}

impl From<i32> for Coefficient {
    fn from(n: i32) -> Self {
        Coefficient::int(n as i64)
    }
}

impl From<f64> for Coefficient {
    fn from(f: f64) -> Self {
        Coefficient::from_f64_exact(f)
    }
}

impl Neg for Coefficient {
    type Output = Coefficient;

    fn neg(self) -> Self::Output {
        match self {
            Coefficient::Rational(n, d) => Coefficient::from_i128(-(n as i128), d as i128),
            Coefficient::Float(f) => Coefficient::Float(-f),
        }
    }
}

impl Add for Coefficient {
    type Output = Coefficient;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Coefficient::Rational(n1, d1), Coefficient::Rational(n2, d2)) => {
                let (n1, d1, n2, d2) = (n1 as i128, d1 as i128, n2 as i128, d2 as i128);
                Coefficient::from_i128(n1 * d2 + n2 * d1, d1 * d2)
            }
            (a, b) => Coefficient::Float(a.to_f64() + b.to_f64()),
        }
    }
}

impl Sub for Coefficient {
    type Output = Coefficient;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul for Coefficient {
    type Output = Coefficient;

    fn mul(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Coefficient::Rational(n1, d1), Coefficient::Rational(n2, d2)) => {
                Coefficient::from_i128(n1 as i128 * n2 as i128, d1 as i128 * d2 as i128)
            }
            (a, b) => Coefficient::Float(a.to_f64() * b.to_f64()),
        }
    }
}

impl Div for Coefficient {
    type Output = Coefficient;

    fn div(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Coefficient::Rational(n1, d1), Coefficient::Rational(n2, d2)) => {
                Coefficient::from_i128(n1 as i128 * d2 as i128, d1 as i128 * n2 as i128)
            }
            (a, b) => Coefficient::Float(a.to_f64() / b.to_f64()),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Rational(n, 1) => write!(f, "{}", n),
            Coefficient::Rational(n, d) => write!(f, "{}/{}", n, d),
            Coefficient::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Coefficient::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_arithmetic() {
        let half = Coefficient::rational(1, 2);
        let third = Coefficient::rational(1, 3);

        assert_eq!(half + third, Coefficient::rational(5, 6));
        assert_eq!(half - third, Coefficient::rational(1, 6));
        assert_eq!(half * third, Coefficient::rational(1, 6));
        assert_eq!(half / third, Coefficient::rational(3, 2));
    }

    #[test]
    fn test_reduction_and_sign() {
        assert_eq!(Coefficient::rational(4, -6), Coefficient::rational(-2, 3));
        assert_eq!(Coefficient::rational(4, -6).denom(), Some(3));
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        let big = Coefficient::int(i64::MAX);
        let sum = big + Coefficient::int(i64::MAX);
        assert!(sum.is_float());
        assert!((sum.to_f64() - 2.0 * i64::MAX as f64).abs() < 1e6);
    }

    #[test]
    fn test_powers() {
        let a = Coefficient::rational(2, 3);
        assert_eq!(a.pow_int(2), Some(Coefficient::rational(4, 9)));
        assert_eq!(a.pow_int(-1), Some(Coefficient::rational(3, 2)));
        assert_eq!(Coefficient::int(0).pow_int(-1), None);

        let four = Coefficient::int(4);
        assert_eq!(four.pow(&Coefficient::rational(1, 2)), Some(Coefficient::int(2)));
        assert_eq!(Coefficient::int(2).pow(&Coefficient::rational(1, 2)), None);
        assert_eq!(
            Coefficient::rational(9, 4).pow(&Coefficient::rational(-1, 2)),
            Some(Coefficient::rational(2, 3))
        );
    }

    #[test]
    fn test_ordering_is_total_and_consistent() {
        let third = Coefficient::rational(1, 3);
        let approx = Coefficient::float(1.0 / 3.0);
        assert_ne!(third, approx);
        assert_ne!(third.cmp(&approx), Ordering::Equal);
        assert!(Coefficient::int(-1) < Coefficient::rational(1, 2));
        assert_eq!(Coefficient::float(-0.0), Coefficient::float(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Coefficient::int(-3).to_string(), "-3");
        assert_eq!(Coefficient::rational(1, 2).to_string(), "1/2");
        assert_eq!(Coefficient::float(11.89).to_string(), "11.89");
        assert_eq!(Coefficient::float(2.0).to_string(), "2.0");
    }
}
