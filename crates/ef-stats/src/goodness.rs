//! Chi-square goodness of fit.

use crate::error::{StatsError, StatsResult};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Probability that a chi-square variate with `nu` degrees of freedom
/// exceeds `chi2` (the survival function).
///
/// Q near 1 flags a fit that is better than the stated errors justify;
/// Q near 0 flags a poor fit or underestimated errors.
pub fn chi_square_q(chi2: f64, nu: usize) -> StatsResult<f64> {
    if nu == 0 {
        return Err(StatsError::InvalidArg {
            what: "degrees of freedom must be positive",
        });
    }
    if chi2.is_nan() {
        return Err(StatsError::InvalidArg {
            what: "chi-square statistic is NaN",
        });
    }
    if chi2 <= 0.0 {
        return Ok(1.0);
    }
    let dist = ChiSquared::new(nu as f64).map_err(|_| StatsError::InvalidArg {
        what: "chi-square distribution parameters",
    })?;
    Ok(dist.sf(chi2).clamp(0.0, 1.0))
}
