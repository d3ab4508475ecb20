//! Error types for regression.

use ef_core::CoreError;
use thiserror::Error;

/// Errors that can occur while fitting a line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Δ = S·Sxx − Sx² vanished (all x equal, or overflow).
    #[error("Degenerate regression: {what}")]
    Degenerate { what: &'static str },

    #[error("Need at least {needed} points for a line fit, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Length mismatch: {what} (expected {expected}, got {got})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid measurement sigma: {value}")]
    InvalidSigma { value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type StatsResult<T> = Result<T, StatsError>;

impl StatsError {
    /// True for the numeric degeneracies a caller may recover from by
    /// changing the data window.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, StatsError::Degenerate { .. })
    }
}
