//! Property and film-model errors.

use ef_core::CoreError;
use thiserror::Error;

/// Result type for property and film-state evaluation.
pub type PropsResult<T> = Result<T, PropsError>;

/// Errors that can occur during property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropsError {
    /// A selector name (correlation, averaging rule) was not recognized.
    #[error("Configuration error: unknown {kind} '{name}' (expected {expected})")]
    UnknownSelector {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },

    /// A configuration value is outside its valid domain.
    #[error("Configuration error: {what}")]
    Configuration { what: &'static str },

    /// Non-physical values (negative density, saturated carrier, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value outside the validity range of a correlation.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl PropsError {
    /// Configuration misuse, which must be fixed by the caller and never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PropsError::UnknownSelector { .. } | PropsError::Configuration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PropsError::UnknownSelector {
            kind: "diffusion correlation",
            name: "C".into(),
            expected: "A or B",
        };
        let msg = err.to_string();
        assert!(msg.contains("'C'"));
        assert!(msg.contains("Configuration"));
        assert!(err.is_configuration());
    }

    #[test]
    fn backend_error_is_not_configuration() {
        let err = PropsError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn core_error_converts() {
        let err: PropsError = CoreError::NegativeSigma { value: -1.0 }.into();
        assert!(matches!(err, PropsError::Core(_)));
        assert!(!err.is_configuration());
    }
}
