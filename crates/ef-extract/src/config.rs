//! Extractor configuration.
//!
//! Every field has a default, so a YAML file only needs to name what it
//! changes:
//!
//! ```yaml
//! error_threshold: 0.02
//! film:
//!   diffusion: B
//!   rule: one-third
//! ```

use std::path::Path;

use ef_core::UncertaintyValue;
use ef_core::units::CELSIUS_OFFSET;
use ef_props::FilmConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Standard deviations of the chamber sensors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorUncertainty {
    /// Balance [kg].
    pub mass: f64,
    /// Pressure transducer, as a fraction of the reading.
    pub pressure_fraction: f64,
    /// Dew-point mirror [K].
    pub dew_point: f64,
    /// Each ambient thermocouple [K].
    pub ambient: f64,
    /// Infrared surface sensor [K].
    pub surface: f64,
}

impl Default for SensorUncertainty {
    fn default() -> Self {
        Self {
            mass: 1e-7,
            pressure_fraction: 0.0015,
            dew_point: 0.2,
            ambient: 0.2,
            surface: 0.5,
        }
    }
}

/// Linear correction of the infrared surface reading, in °C:
/// `T' = intercept + slope · T`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub intercept: UncertaintyValue,
    pub slope: UncertaintyValue,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            intercept: UncertaintyValue::constant(-2.34, 0.07),
            slope: UncertaintyValue::constant(1.0445, 0.0022),
        }
    }
}

impl Calibration {
    /// Corrects a surface temperature given in kelvin.
    pub fn apply_kelvin(&self, t: UncertaintyValue) -> UncertaintyValue {
        let celsius = t - CELSIUS_OFFSET;
        self.intercept + self.slope * celsius + CELSIUS_OFFSET
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Largest accepted relative slope error |σb / b|.
    pub error_threshold: f64,
    /// Half-width increment of the window search.
    pub step: usize,
    pub sensors: SensorUncertainty,
    pub calibration: Calibration,
    pub film: FilmConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            error_threshold: 0.01,
            step: 1,
            sensors: SensorUncertainty::default(),
            calibration: Calibration::default(),
            film: FilmConfig::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_yaml_str(s: &str) -> ExtractResult<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> ExtractResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> ExtractResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ExtractResult<()> {
        if !(self.error_threshold.is_finite() && self.error_threshold > 0.0) {
            return Err(configuration("error_threshold must be positive and finite"));
        }
        if self.step == 0 {
            return Err(configuration("step must be at least 1"));
        }
        let s = &self.sensors;
        if !(s.mass.is_finite() && s.mass > 0.0) {
            return Err(configuration("mass sensor sigma must be positive"));
        }
        for (name, v) in [
            ("pressure_fraction", s.pressure_fraction),
            ("dew_point", s.dew_point),
            ("ambient", s.ambient),
            ("surface", s.surface),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(configuration(format!(
                    "{name} sensor sigma must be non-negative and finite"
                )));
            }
        }
        self.film.validate()?;
        Ok(())
    }
}

fn configuration(what: impl Into<String>) -> ExtractError {
    ExtractError::Configuration { what: what.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ef_props::{DiffusionCorrelation, FilmRule};

    #[test]
    fn defaults_are_valid() {
        ExtractorConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "error_threshold: 0.02\nfilm:\n  diffusion: B\n  rule: one-third\n";
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.error_threshold, 0.02);
        assert_eq!(config.step, 1);
        assert_eq!(config.film.diffusion, DiffusionCorrelation::Marrero);
        assert_eq!(config.film.rule, FilmRule::OneThird);
        assert_eq!(config.film.m1, 18.015);
        assert_eq!(config.sensors, SensorUncertainty::default());
    }

    #[test]
    fn yaml_round_trip() {
        let config = ExtractorConfig::default();
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(ExtractorConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn unknown_correlation_is_a_configuration_error() {
        let err = ExtractorConfig::from_yaml_str("film:\n  diffusion: C\n").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("diffusion correlation"), "{err}");
    }

    #[test]
    fn negative_sigma_in_yaml_is_rejected() {
        let yaml = "calibration:\n  slope: { nominal: 1.0, sigma: -0.1 }\n";
        assert!(ExtractorConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad = [
            ExtractorConfig {
                error_threshold: 0.0,
                ..Default::default()
            },
            ExtractorConfig {
                step: 0,
                ..Default::default()
            },
            ExtractorConfig {
                sensors: SensorUncertainty {
                    mass: 0.0,
                    ..Default::default()
                },
                ..Default::default()
            },
            ExtractorConfig {
                sensors: SensorUncertainty {
                    surface: f64::NAN,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().unwrap_err().is_configuration());
        }
    }

    #[test]
    fn calibration_corrects_in_celsius() {
        let cal = Calibration::default();
        let t = cal.apply_kelvin(UncertaintyValue::exact(CELSIUS_OFFSET + 10.0));
        assert!((t.nominal() - (CELSIUS_OFFSET - 2.34 + 10.445)).abs() < 1e-9);
        // σ² = 0.07² + (10 · 0.0022)²
        assert!((t.sigma() - 0.07_f64.hypot(0.022)).abs() < 1e-12);
    }
}
