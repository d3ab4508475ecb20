//! Raw chamber observations.

use ef_core::units::{Mass, Pressure, Temperature};
use ef_core::{CoreResult, UncertaintyValue, mean};

/// Equipment health at the time of an observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub cap_man_ok: bool,
    pub optidew_ok: bool,
}

/// One sample of the chamber sensors. Observations are expected at a fixed
/// one-second cadence; `idx` is the acquisition time index.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub idx: i64,
    pub mass: Mass,
    pub pressure: Pressure,
    pub dew_point: Temperature,
    /// One reading per ambient thermocouple.
    pub ambient_temperatures: Vec<Temperature>,
    pub surface_temperature: Temperature,
    pub status: StatusFlags,
}

impl Observation {
    /// Mean ambient temperature [K], each thermocouple carrying `sensor_sigma`.
    pub fn ambient_temperature(&self, sensor_sigma: f64) -> CoreResult<UncertaintyValue> {
        let readings = self
            .ambient_temperatures
            .iter()
            .map(|t| UncertaintyValue::new(t.value, sensor_sigma))
            .collect::<CoreResult<Vec<_>>>()?;
        mean(&readings)
    }

    pub fn is_healthy(&self) -> bool {
        self.status.cap_man_ok && self.status.optidew_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ef_core::units::{k, kg, pa};

    fn obs(ambient: Vec<f64>) -> Observation {
        Observation {
            idx: 0,
            mass: kg(0.1),
            pressure: pa(101_325.0),
            dew_point: k(280.0),
            ambient_temperatures: ambient.into_iter().map(k).collect(),
            surface_temperature: k(285.0),
            status: StatusFlags {
                cap_man_ok: true,
                optidew_ok: true,
            },
        }
    }

    #[test]
    fn ambient_mean_shrinks_sigma() {
        let t = obs(vec![289.0, 290.0, 291.0, 290.0]).ambient_temperature(0.2).unwrap();
        assert!((t.nominal() - 290.0).abs() < 1e-12);
        assert!((t.sigma() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn no_thermocouples_is_an_error() {
        assert!(obs(vec![]).ambient_temperature(0.2).is_err());
    }

    #[test]
    fn health_requires_both_flags() {
        let mut o = obs(vec![290.0]);
        assert!(o.is_healthy());
        o.status.optidew_ok = false;
        assert!(!o.is_healthy());
    }
}
