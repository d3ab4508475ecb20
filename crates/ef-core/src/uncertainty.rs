//! Values with first-order (linear) uncertainty.
//!
//! `UncertaintyValue` pairs a nominal value with a standard deviation. The
//! arithmetic operators treat operands as independent:
//!
//! - `+`/`-`: absolute errors add in quadrature
//! - `*`/`/`: relative errors add in quadrature
//! - `ln`, `powf`, `sqrt`: derivative scaling
//!
//! Properties without a closed-form derivative go through [`propagate`] /
//! [`propagate_many`], which estimate the output sigma by finite differences.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A nominal value with a non-negative standard deviation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncertaintyRepr", into = "UncertaintyRepr")]
pub struct UncertaintyValue {
    nominal: f64,
    sigma: f64,
}

/// Serialized form; validated on the way in.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct UncertaintyRepr {
    nominal: f64,
    #[serde(default)]
    sigma: f64,
}

impl TryFrom<UncertaintyRepr> for UncertaintyValue {
    type Error = CoreError;

    fn try_from(repr: UncertaintyRepr) -> CoreResult<Self> {
        Self::new(repr.nominal, repr.sigma)
    }
}

impl From<UncertaintyValue> for UncertaintyRepr {
    fn from(value: UncertaintyValue) -> Self {
        Self {
            nominal: value.nominal,
            sigma: value.sigma,
        }
    }
}

impl UncertaintyValue {
    /// Create a value, rejecting negative or non-finite sigma and a non-finite nominal.
    pub fn new(nominal: f64, sigma: f64) -> CoreResult<Self> {
        if !nominal.is_finite() {
            return Err(CoreError::NonFinite {
                what: "nominal value",
                value: nominal,
            });
        }
        if !sigma.is_finite() {
            return Err(CoreError::NonFinite {
                what: "standard deviation",
                value: sigma,
            });
        }
        if sigma < 0.0 {
            return Err(CoreError::NegativeSigma { value: sigma });
        }
        Ok(Self { nominal, sigma })
    }

    /// Constructor for literal constants. Invalid arguments panic, which is a
    /// compile error when evaluated in a `const` item.
    pub const fn constant(nominal: f64, sigma: f64) -> Self {
        assert!(nominal.is_finite() && sigma.is_finite() && sigma >= 0.0);
        Self { nominal, sigma }
    }

    /// A value known exactly (sigma = 0).
    pub const fn exact(nominal: f64) -> Self {
        Self {
            nominal,
            sigma: 0.0,
        }
    }

    #[inline]
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// |sigma / nominal|; infinite for a zero nominal with nonzero sigma.
    pub fn relative_sigma(&self) -> f64 {
        if self.sigma == 0.0 {
            0.0
        } else {
            (self.sigma / self.nominal).abs()
        }
    }

    /// Check that an arithmetic result is still finite.
    ///
    /// Operators follow IEEE semantics (dividing by zero gives infinities), so
    /// chains that may hit a singularity should finish with this.
    pub fn ensure_finite(self, what: &'static str) -> CoreResult<Self> {
        if !self.nominal.is_finite() {
            return Err(CoreError::NonFinite {
                what,
                value: self.nominal,
            });
        }
        if !self.sigma.is_finite() {
            return Err(CoreError::NonFinite {
                what,
                value: self.sigma,
            });
        }
        Ok(self)
    }

    /// Natural logarithm.
    pub fn ln(self) -> Self {
        Self {
            nominal: self.nominal.ln(),
            sigma: (self.sigma / self.nominal).abs(),
        }
    }

    /// Real power `x^exponent` with an exact exponent.
    pub fn powf(self, exponent: f64) -> Self {
        let derivative = exponent * self.nominal.powf(exponent - 1.0);
        Self {
            nominal: self.nominal.powf(exponent),
            sigma: (derivative * self.sigma).abs(),
        }
    }

    pub fn powi(self, exponent: i32) -> Self {
        self.powf(f64::from(exponent))
    }

    pub fn sqrt(self) -> Self {
        self.powf(0.5)
    }
}

impl fmt::Display for UncertaintyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} ± {:.*}", p, self.nominal, p, self.sigma),
            None => write!(f, "{} ± {}", self.nominal, self.sigma),
        }
    }
}

impl From<f64> for UncertaintyValue {
    fn from(nominal: f64) -> Self {
        Self::exact(nominal)
    }
}

impl Neg for UncertaintyValue {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            nominal: -self.nominal,
            sigma: self.sigma,
        }
    }
}

impl Add for UncertaintyValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            nominal: self.nominal + rhs.nominal,
            sigma: self.sigma.hypot(rhs.sigma),
        }
    }
}

impl Sub for UncertaintyValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            nominal: self.nominal - rhs.nominal,
            sigma: self.sigma.hypot(rhs.sigma),
        }
    }
}

impl Mul for UncertaintyValue {
    type Output = Self;

    // |ab|·√((σa/a)² + (σb/b)²), written so that a zero operand stays finite.
    fn mul(self, rhs: Self) -> Self {
        Self {
            nominal: self.nominal * rhs.nominal,
            sigma: (rhs.nominal * self.sigma).hypot(self.nominal * rhs.sigma),
        }
    }
}

impl Div for UncertaintyValue {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let q = self.nominal / rhs.nominal;
        Self {
            nominal: q,
            sigma: (self.sigma / rhs.nominal).hypot(q * rhs.sigma / rhs.nominal),
        }
    }
}

impl Add<f64> for UncertaintyValue {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        self + Self::exact(rhs)
    }
}

impl Sub<f64> for UncertaintyValue {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        self - Self::exact(rhs)
    }
}

impl Mul<f64> for UncertaintyValue {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self * Self::exact(rhs)
    }
}

impl Div<f64> for UncertaintyValue {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self / Self::exact(rhs)
    }
}

impl Add<UncertaintyValue> for f64 {
    type Output = UncertaintyValue;

    fn add(self, rhs: UncertaintyValue) -> UncertaintyValue {
        UncertaintyValue::exact(self) + rhs
    }
}

impl Sub<UncertaintyValue> for f64 {
    type Output = UncertaintyValue;

    fn sub(self, rhs: UncertaintyValue) -> UncertaintyValue {
        UncertaintyValue::exact(self) - rhs
    }
}

impl Mul<UncertaintyValue> for f64 {
    type Output = UncertaintyValue;

    fn mul(self, rhs: UncertaintyValue) -> UncertaintyValue {
        UncertaintyValue::exact(self) * rhs
    }
}

impl Div<UncertaintyValue> for f64 {
    type Output = UncertaintyValue;

    fn div(self, rhs: UncertaintyValue) -> UncertaintyValue {
        UncertaintyValue::exact(self) / rhs
    }
}

impl Sum for UncertaintyValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::exact(0.0), Add::add)
    }
}

impl<'a> Sum<&'a UncertaintyValue> for UncertaintyValue {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Arithmetic mean of independent values.
pub fn mean(values: &[UncertaintyValue]) -> CoreResult<UncertaintyValue> {
    if values.is_empty() {
        return Err(CoreError::InvalidArg {
            what: "mean of an empty slice",
        });
    }
    let total: UncertaintyValue = values.iter().sum();
    Ok(total / values.len() as f64)
}

/// Finite-difference sensitivity propagation for a scalar function.
///
/// See [`propagate_many`].
pub fn propagate<F, E, const N: usize>(
    inputs: &[UncertaintyValue; N],
    f: F,
) -> Result<UncertaintyValue, E>
where
    F: Fn(&[f64; N]) -> Result<f64, E>,
    E: From<CoreError>,
{
    let [out] = propagate_many(inputs, |x| f(x).map(|v| [v]))?;
    Ok(out)
}

/// Finite-difference sensitivity propagation for an array-valued function.
///
/// `f` is evaluated once at the nominal inputs and once more per input with
/// that input shifted by its own sigma. Each output's sigma is the root sum
/// of squares of its deltas. This is a first-order, one-at-a-time Jacobian
/// estimate: cross terms and curvature are ignored, and inputs are assumed
/// independent. Inputs with zero sigma are not re-evaluated.
pub fn propagate_many<F, E, const N: usize, const M: usize>(
    inputs: &[UncertaintyValue; N],
    f: F,
) -> Result<[UncertaintyValue; M], E>
where
    F: Fn(&[f64; N]) -> Result<[f64; M], E>,
    E: From<CoreError>,
{
    let nominal: [f64; N] = core::array::from_fn(|i| inputs[i].nominal);
    let base = f(&nominal)?;

    let mut sum_sq = [0.0_f64; M];
    for (i, input) in inputs.iter().enumerate() {
        if input.sigma == 0.0 {
            continue;
        }
        let mut shifted = nominal;
        shifted[i] += input.sigma;
        let perturbed = f(&shifted)?;
        for (acc, (p, b)) in sum_sq.iter_mut().zip(perturbed.iter().zip(base.iter())) {
            let delta = p - b;
            *acc += delta * delta;
        }
    }

    let mut out = [UncertaintyValue::default(); M];
    for (slot, (value, sq)) in out.iter_mut().zip(base.iter().zip(sum_sq.iter())) {
        *slot = UncertaintyValue::new(*value, sq.sqrt())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv(n: f64, s: f64) -> UncertaintyValue {
        UncertaintyValue::new(n, s).unwrap()
    }

    #[test]
    fn constant_matches_checked_constructor() {
        const R: UncertaintyValue = UncertaintyValue::constant(0.015, 0.0001);
        assert_eq!(R, uv(0.015, 0.0001));
    }

    #[test]
    fn exact_addition() {
        let sum = uv(5.0, 0.0) + uv(3.0, 0.0);
        assert_eq!(sum, uv(8.0, 0.0));
    }

    #[test]
    fn exact_product_has_no_sigma() {
        let prod = UncertaintyValue::exact(2.5) * UncertaintyValue::exact(-4.0);
        assert_eq!(prod.nominal(), -10.0);
        assert_eq!(prod.sigma(), 0.0);
    }

    #[test]
    fn addition_adds_sigmas_in_quadrature() {
        let sum = uv(1.0, 0.3) + uv(2.0, 0.4);
        assert!((sum.sigma() - 0.5).abs() < 1e-15);
        let diff = uv(1.0, 0.3) - uv(2.0, 0.4);
        assert_eq!(diff.nominal(), -1.0);
        assert!((diff.sigma() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn product_and_quotient_add_relative_errors() {
        let a = uv(10.0, 0.3);
        let b = uv(4.0, 0.16);
        let rel = (0.03_f64.powi(2) + 0.04_f64.powi(2)).sqrt();

        let p = a * b;
        assert!((p.relative_sigma() - rel).abs() < 1e-12);

        let q = a / b;
        assert_eq!(q.nominal(), 2.5);
        assert!((q.relative_sigma() - rel).abs() < 1e-12);
    }

    #[test]
    fn product_with_zero_operand_is_finite() {
        let p = uv(0.0, 0.1) * uv(3.0, 0.2);
        assert_eq!(p.nominal(), 0.0);
        assert!((p.sigma() - 0.3).abs() < 1e-15);
    }

    #[test]
    fn log_scales_by_derivative() {
        let x = uv(2.0, 0.1);
        let l = x.ln();
        assert!((l.nominal() - 2.0_f64.ln()).abs() < 1e-15);
        assert!((l.sigma() - 0.05).abs() < 1e-15);
    }

    #[test]
    fn power_scales_by_derivative() {
        let x = uv(3.0, 0.1);
        let cube = x.powi(3);
        assert!((cube.nominal() - 27.0).abs() < 1e-12);
        assert!((cube.sigma() - 2.7).abs() < 1e-12);
    }

    #[test]
    fn rejects_negative_sigma() {
        assert!(matches!(
            UncertaintyValue::new(1.0, -0.1),
            Err(CoreError::NegativeSigma { .. })
        ));
        assert!(UncertaintyValue::new(f64::NAN, 0.1).is_err());
        assert!(UncertaintyValue::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn mean_of_equal_sigmas_shrinks_by_sqrt_n() {
        let readings = [uv(290.0, 0.2), uv(291.0, 0.2), uv(289.0, 0.2), uv(290.0, 0.2)];
        let m = mean(&readings).unwrap();
        assert!((m.nominal() - 290.0).abs() < 1e-12);
        assert!((m.sigma() - 0.1).abs() < 1e-12);
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn propagate_matches_linear_rule() {
        let inputs = [uv(1.0, 0.3), uv(2.0, 0.4)];
        let out = propagate(&inputs, |x| Ok::<_, CoreError>(x[0] + 2.0 * x[1])).unwrap();
        assert_eq!(out.nominal(), 5.0);
        assert!((out.sigma() - (0.09_f64 + 0.64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn propagate_many_keeps_outputs_separate() {
        let inputs = [uv(2.0, 0.1), UncertaintyValue::exact(5.0)];
        let [a, b] = propagate_many(&inputs, |x| Ok::<_, CoreError>([x[0] * 3.0, x[1]])).unwrap();
        assert!((a.sigma() - 0.3).abs() < 1e-12);
        assert_eq!(b.sigma(), 0.0);
    }

    #[test]
    fn propagate_reports_non_finite_output() {
        let inputs = [uv(0.0, 0.1)];
        let res = propagate(&inputs, |x| Ok::<_, CoreError>(1.0 / x[0]));
        assert!(res.is_err());
    }

    #[test]
    fn display_respects_precision() {
        let x = uv(1.23456, 0.01);
        assert_eq!(format!("{x:.2}"), "1.23 ± 0.01");
    }
}
