//! Weighted straight-line fitting with chi-square goodness of fit.
//!
//! Implements the classical weighted least-squares line fit for data with
//! known measurement errors:
//!
//! ```text
//! minimize χ² = Σ ((y_i - a - b x_i) / σ_i)²
//! ```
//!
//! and reports the parameter uncertainties, R², χ² and the goodness-of-fit
//! probability Q (upper tail of the chi-square distribution).

pub mod error;
pub mod goodness;
pub mod regression;

pub use error::{StatsError, StatsResult};
pub use goodness::chi_square_q;
pub use regression::{LinearFit, Sigma, fit_indexed, weighted_fit};
