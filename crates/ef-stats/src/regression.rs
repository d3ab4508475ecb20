//! Weighted least-squares straight line.
//!
//! With weights w_i = 1/σ_i² the normal equations reduce to five sums:
//!
//! ```text
//! S = Σw   Sx = Σwx   Sy = Σwy   Sxx = Σwx²   Sxy = Σwxy
//! Δ = S·Sxx − Sx²
//! a = (Sxx·Sy − Sx·Sxy)/Δ     σa = √(Sxx/Δ)
//! b = (S·Sxy − Sx·Sy)/Δ       σb = √(S/Δ)
//! ```
//!
//! σa and σb depend only on x and σ, never on the scatter of y.

use crate::error::{StatsError, StatsResult};
use crate::goodness::chi_square_q;
use ef_core::UncertaintyValue;
use serde::{Deserialize, Serialize};

/// Measurement error of the y values.
#[derive(Clone, Copy, Debug)]
pub enum Sigma<'a> {
    /// The same sigma for every point.
    Constant(f64),
    /// One sigma per point.
    PerPoint(&'a [f64]),
}

impl Sigma<'_> {
    fn at(&self, i: usize) -> f64 {
        match self {
            Sigma::Constant(s) => *s,
            Sigma::PerPoint(s) => s[i],
        }
    }

    fn validate(&self, n: usize) -> StatsResult<()> {
        match self {
            Sigma::Constant(s) => validate_sigma(*s),
            Sigma::PerPoint(s) => {
                if s.len() != n {
                    return Err(StatsError::LengthMismatch {
                        what: "sigma",
                        expected: n,
                        got: s.len(),
                    });
                }
                s.iter().try_for_each(|&v| validate_sigma(v))
            }
        }
    }
}

fn validate_sigma(s: f64) -> StatsResult<()> {
    if !s.is_finite() || s <= 0.0 {
        return Err(StatsError::InvalidSigma { value: s });
    }
    Ok(())
}

/// Result of a weighted line fit `y = a + b·x`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Intercept.
    pub a: f64,
    pub sig_a: f64,
    /// Slope.
    pub b: f64,
    pub sig_b: f64,
    /// Coefficient of determination, about the unweighted mean of y.
    pub r2: f64,
    /// χ² merit value.
    pub chi2: f64,
    /// Goodness-of-fit probability.
    pub q: f64,
    /// Degrees of freedom, n − 2.
    pub nu: usize,
}

impl LinearFit {
    pub fn intercept(&self) -> UncertaintyValue {
        UncertaintyValue::new(self.a, self.sig_a).unwrap_or(UncertaintyValue::exact(self.a))
    }

    pub fn slope(&self) -> UncertaintyValue {
        UncertaintyValue::new(self.b, self.sig_b).unwrap_or(UncertaintyValue::exact(self.b))
    }

    /// |σb / b|; infinite for a zero slope.
    pub fn relative_slope_error(&self) -> f64 {
        (self.sig_b / self.b).abs()
    }

    /// Number of points in the fit.
    pub fn len(&self) -> usize {
        self.nu + 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.a + self.b * x
    }
}

/// Fit `y = a + b·x` by weighted least squares.
///
/// Fails with [`StatsError::Degenerate`] when Δ = 0, e.g. every x equal.
pub fn weighted_fit(x: &[f64], y: &[f64], sigma: Sigma<'_>) -> StatsResult<LinearFit> {
    let n = x.len();
    if y.len() != n {
        return Err(StatsError::LengthMismatch {
            what: "y",
            expected: n,
            got: y.len(),
        });
    }
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }
    sigma.validate(n)?;

    let (mut s, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for i in 0..n {
        let w = 1.0 / (sigma.at(i) * sigma.at(i));
        s += w;
        sx += w * x[i];
        sy += w * y[i];
        sxx += w * x[i] * x[i];
        sxy += w * x[i] * y[i];
    }

    let delta = s * sxx - sx * sx;
    if !delta.is_finite() || delta <= 0.0 {
        return Err(StatsError::Degenerate {
            what: "S·Sxx − Sx² is zero",
        });
    }

    let a = (sxx * sy - sx * sxy) / delta;
    let b = (s * sxy - sx * sy) / delta;
    let sig_a = (sxx / delta).sqrt();
    let sig_b = (s / delta).sqrt();
    if ![a, b, sig_a, sig_b].iter().all(|v| v.is_finite()) {
        return Err(StatsError::Degenerate {
            what: "non-finite fit parameters",
        });
    }

    let mut chi2 = 0.0;
    let mut ss_res = 0.0;
    for i in 0..n {
        let r = y[i] - a - b * x[i];
        chi2 += (r / sigma.at(i)).powi(2);
        ss_res += r * r;
    }

    let y_bar = y.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - y_bar).powi(2)).sum();
    // Sums of squares at or below this are rounding noise in y.
    let y_max = y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let floor = n as f64 * (64.0 * f64::EPSILON * y_max).powi(2);
    let r2 = if ss_tot > floor {
        1.0 - ss_res / ss_tot
    } else if ss_res <= floor {
        1.0
    } else {
        0.0
    };

    let nu = n - 2;
    let q = chi_square_q(chi2, nu)?;

    Ok(LinearFit {
        a,
        sig_a,
        b,
        sig_b,
        r2,
        chi2,
        q,
        nu,
    })
}

/// Fit `y` against its own positions 0, 1, …, n−1.
pub fn fit_indexed(y: &[f64], sigma: Sigma<'_>) -> StatsResult<LinearFit> {
    let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
    weighted_fit(&x, y, sigma)
}
