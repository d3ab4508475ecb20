//! Accepted fit windows.

use ef_core::UncertaintyValue;
use ef_props::{ExperimentalState, FilmSolution};
use ef_stats::LinearFit;
use serde::{Deserialize, Serialize};

/// A span of the series whose mass trend met the slope-error threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitWindow {
    /// First position in the series (inclusive).
    pub start: usize,
    /// Last position in the series (inclusive).
    pub end: usize,
    /// Time index of the first observation.
    pub start_idx: i64,
    /// Mass at the window start [kg].
    pub intercept: UncertaintyValue,
    /// Mass rate [kg/s]; negative while evaporating.
    pub slope: UncertaintyValue,
    pub r2: f64,
    pub chi2: f64,
    pub q: f64,
    pub nu: usize,
    pub state: ExperimentalState,
    /// `None` when the film model rejected the state as non-physical.
    pub film: Option<FilmSolution>,
    /// Observations in the window taken while an instrument reported a fault.
    pub unhealthy: usize,
}

impl FitWindow {
    pub(crate) fn new(
        start: usize,
        start_idx: i64,
        fit: &LinearFit,
        state: ExperimentalState,
        film: Option<FilmSolution>,
        unhealthy: usize,
    ) -> Self {
        Self {
            start,
            end: start + fit.len() - 1,
            start_idx,
            intercept: fit.intercept(),
            slope: fit.slope(),
            r2: fit.r2,
            chi2: fit.chi2,
            q: fit.q,
            nu: fit.nu,
            state,
            film,
            unhealthy,
        }
    }

    /// Number of observations in the window.
    pub fn points(&self) -> usize {
        self.end - self.start + 1
    }

    /// Evaporation rate `−slope` [kg/s].
    pub fn evaporation_rate(&self) -> UncertaintyValue {
        -self.slope
    }
}
