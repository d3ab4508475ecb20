//! Adaptive-window scan over a mass time series.
//!
//! The scan walks a pointer through the series. At each position it takes
//! the largest sample centred on the pointer and grows a fit window outward
//! from the centre until the slope's relative error drops below the
//! threshold. An accepted window moves the pointer past it; otherwise the
//! pointer skips the whole sample.

use ef_core::{UncertaintyValue, mean};
use ef_props::{ExperimentalState, FilmSolution, FilmStateSolver};
use ef_stats::{LinearFit, Sigma, fit_indexed};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::ExtractResult;
use crate::observation::Observation;
use crate::window::FitWindow;

/// Scan pointer. The first evaluated position is 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanState {
    pub idx: usize,
}

impl Default for ScanState {
    fn default() -> Self {
        Self { idx: 1 }
    }
}

impl ScanState {
    /// A full centred sample needs at least two points after the pointer.
    pub fn is_done(&self, len: usize) -> bool {
        self.idx + 2 >= len
    }
}

/// Outcome of one outer scan step.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanStep {
    pub next: ScanState,
    pub window: Option<FitWindow>,
}

/// Outcome of the inner window search over one sample.
#[derive(Clone, Debug, PartialEq)]
pub enum WindowSearch {
    /// `offset` is the window's first position within the sample.
    Accepted { offset: usize, fit: LinearFit },
    NoFitFound,
}

pub struct TimeSeriesFitExtractor {
    config: ExtractorConfig,
    solver: FilmStateSolver,
}

impl TimeSeriesFitExtractor {
    pub fn new(config: ExtractorConfig) -> ExtractResult<Self> {
        config.validate()?;
        let solver = FilmStateSolver::new(config.film.clone())?;
        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs the scan to completion.
    pub fn extract(&self, series: &[Observation]) -> ExtractResult<Vec<FitWindow>> {
        let mut state = ScanState::default();
        let mut windows = Vec::new();
        let mut steps = 0_usize;
        while let Some(step) = self.step(&state, series)? {
            windows.extend(step.window);
            state = step.next;
            steps += 1;
        }
        info!(
            observations = series.len(),
            steps,
            windows = windows.len(),
            "scan complete"
        );
        Ok(windows)
    }

    /// Extracts several independent experiments in parallel. Results are in
    /// input order.
    pub fn extract_batch(
        &self,
        experiments: &[Vec<Observation>],
    ) -> Vec<ExtractResult<Vec<FitWindow>>> {
        experiments
            .par_iter()
            .map(|series| self.extract(series))
            .collect()
    }

    /// One outer step from `state`, or `None` once the pointer has reached
    /// the end of the series.
    pub fn step(&self, state: &ScanState, series: &[Observation]) -> ExtractResult<Option<ScanStep>> {
        let n = series.len();
        if state.is_done(n) {
            return Ok(None);
        }

        let idx = state.idx;
        let half = idx.min(n - 1 - idx);
        let lo = idx - half;
        let sample = &series[lo..=idx + half];
        let mass: Vec<f64> = sample.iter().map(|o| o.mass.value).collect();

        let step = match self.search_window(&mass) {
            WindowSearch::Accepted { offset, fit } => {
                let start = lo + offset;
                let observations = &series[start..start + fit.len()];
                let window = self.build_window(start, observations, &fit);
                if let Some(window) = &window {
                    info!(
                        start,
                        end = window.end,
                        slope = fit.b,
                        rel_err = fit.relative_slope_error(),
                        "window accepted"
                    );
                }
                ScanStep {
                    next: ScanState {
                        idx: idx + fit.nu + 2,
                    },
                    window,
                }
            }
            WindowSearch::NoFitFound => {
                debug!(idx, sample = sample.len(), "no fit in sample");
                ScanStep {
                    next: ScanState {
                        idx: idx + sample.len(),
                    },
                    window: None,
                }
            }
        };
        Ok(Some(step))
    }

    /// Grows a window symmetrically about the centre of `mass` in increments
    /// of the configured step until the slope is resolved to within the
    /// error threshold.
    pub fn search_window(&self, mass: &[f64]) -> WindowSearch {
        let len = mass.len();
        let center = len / 2;
        let delta = self.config.step;
        let sigma = Sigma::Constant(self.config.sensors.mass);

        let mut half = delta;
        while center + half < len && half <= center {
            let offset = center - half;
            let candidate = &mass[offset..=center + half];
            match fit_indexed(candidate, sigma) {
                Ok(fit) if fit.b == 0.0 => {
                    debug!(len = candidate.len(), "zero slope, widening");
                }
                Ok(fit) => {
                    let rel_err = fit.relative_slope_error();
                    debug!(len = candidate.len(), rel_err, "candidate window");
                    if rel_err <= self.config.error_threshold {
                        return WindowSearch::Accepted { offset, fit };
                    }
                }
                Err(e) => {
                    debug!(len = candidate.len(), error = %e, "fit rejected, widening");
                }
            }
            half += delta;
        }
        WindowSearch::NoFitFound
    }

    /// `None` when the window's sensor readings cannot be averaged (missing
    /// thermocouples, non-finite values); the mass fit alone is not kept.
    fn build_window(
        &self,
        start: usize,
        observations: &[Observation],
        fit: &LinearFit,
    ) -> Option<FitWindow> {
        let state = match self.experimental_state(observations) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    start,
                    len = observations.len(),
                    error = %e,
                    "bad sensor data; skipping window"
                );
                return None;
            }
        };
        let unhealthy = observations.iter().filter(|o| !o.is_healthy()).count();
        if unhealthy > 0 {
            warn!(start, unhealthy, "window spans observations with equipment faults");
        }
        let film = self.film_solution(&state, fit);
        Some(FitWindow::new(
            start,
            observations[0].idx,
            fit,
            state,
            film,
            unhealthy,
        ))
    }

    /// Window means of the chamber state, with the surface reading calibrated.
    pub fn experimental_state(&self, observations: &[Observation]) -> ExtractResult<ExperimentalState> {
        let s = &self.config.sensors;

        let mut pressure = Vec::with_capacity(observations.len());
        let mut ambient = Vec::with_capacity(observations.len());
        let mut dew_point = Vec::with_capacity(observations.len());
        let mut surface = Vec::with_capacity(observations.len());
        for o in observations {
            let p = o.pressure.value;
            pressure.push(UncertaintyValue::new(p, (p * s.pressure_fraction).abs())?);
            ambient.push(o.ambient_temperature(s.ambient)?);
            dew_point.push(UncertaintyValue::new(o.dew_point.value, s.dew_point)?);
            surface.push(UncertaintyValue::new(o.surface_temperature.value, s.surface)?);
        }

        Ok(ExperimentalState {
            pressure: mean(&pressure)?,
            ambient_temperature: mean(&ambient)?,
            dew_point: mean(&dew_point)?,
            surface_temperature: self.config.calibration.apply_kelvin(mean(&surface)?),
        })
    }

    fn film_solution(&self, state: &ExperimentalState, fit: &LinearFit) -> Option<FilmSolution> {
        match self.solver.evaluate(state, -fit.slope()) {
            Ok(solution) => Some(solution),
            Err(e) => {
                warn!(error = %e, "film evaluation rejected; keeping window without film state");
                None
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::observation::StatusFlags;
    use ef_core::units::{k, kg, pa};
    use proptest::prelude::*;

    fn series(masses: &[f64]) -> Vec<Observation> {
        masses
            .iter()
            .enumerate()
            .map(|(i, &m)| Observation {
                idx: i as i64,
                mass: kg(m),
                pressure: pa(101_325.0),
                dew_point: k(280.0),
                ambient_temperatures: vec![k(290.0)],
                surface_temperature: k(285.0),
                status: StatusFlags::default(),
            })
            .collect()
    }

    proptest! {
        #[test]
        fn windows_meet_threshold_and_pointer_advances(
            rate in -1e-6_f64..1e-6,
            noise in prop::collection::vec(-2e-7_f64..2e-7, 0..120),
        ) {
            let masses: Vec<f64> = noise
                .iter()
                .enumerate()
                .map(|(i, e)| 0.1 + rate * i as f64 + e)
                .collect();
            let obs = series(&masses);
            let config = ExtractorConfig { error_threshold: 0.05, ..ExtractorConfig::default() };
            let ex = TimeSeriesFitExtractor::new(config).unwrap();

            let mut state = ScanState::default();
            let mut steps = 0;
            while let Some(step) = ex.step(&state, &obs).unwrap() {
                prop_assert!(step.next.idx > state.idx);
                if let Some(w) = &step.window {
                    prop_assert!(w.nu >= 1);
                    prop_assert!(w.end < obs.len());
                    prop_assert!(w.slope.relative_sigma() <= 0.05);
                }
                state = step.next;
                steps += 1;
            }
            prop_assert!(steps <= obs.len());
        }
    }
}
