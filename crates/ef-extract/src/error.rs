//! Error types for fit extraction.

use ef_core::CoreError;
use ef_props::PropsError;
use ef_stats::StatsError;
use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Property error: {0}")]
    Props(#[from] PropsError),

    #[error("Fit error: {0}")]
    Stats(#[from] StatsError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Errors caused by a bad configuration rather than by the data.
    pub fn is_configuration(&self) -> bool {
        match self {
            ExtractError::Configuration { .. } | ExtractError::Yaml(_) => true,
            ExtractError::Props(e) => e.is_configuration(),
            _ => false,
        }
    }
}
