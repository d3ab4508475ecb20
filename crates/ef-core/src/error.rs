use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Negative standard deviation: {value}")]
    NegativeSigma { value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_value() {
        let err = CoreError::NegativeSigma { value: -0.5 };
        assert!(err.to_string().contains("-0.5"));
    }
}
