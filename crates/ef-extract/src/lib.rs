//! ef-extract: adaptive-window fit extraction for evaporation experiments.
//!
//! Scans the mass series of one experiment for windows in which the
//! evaporation rate is resolved to a relative error below a threshold, then
//! reduces each window to an averaged experimental state and, through
//! `ef-props`, to film properties and transfer numbers.
//!
//! # Example
//!
//! ```no_run
//! use ef_extract::{ExtractorConfig, Observation, TimeSeriesFitExtractor};
//!
//! # fn load() -> Vec<Observation> { Vec::new() }
//! let extractor = TimeSeriesFitExtractor::new(ExtractorConfig::default()).unwrap();
//! let series: Vec<Observation> = load();
//! for window in extractor.extract(&series).unwrap() {
//!     println!("{}..={}: {}", window.start, window.end, window.slope);
//! }
//! ```

pub mod config;
pub mod error;
pub mod observation;
pub mod scan;
pub mod window;

pub use config::{Calibration, ExtractorConfig, SensorUncertainty};
pub use ef_props::{ExperimentalState, FilmSolution};
pub use error::{ExtractError, ExtractResult};
pub use observation::{Observation, StatusFlags};
pub use scan::{ScanState, ScanStep, TimeSeriesFitExtractor, WindowSearch};
pub use window::FitWindow;
