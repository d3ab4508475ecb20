//! CoolProp-based property model.

use rfluids::prelude::*;

use crate::error::{PropsError, PropsResult};
use crate::model::{AirProperties, PropertyModel};
use crate::psychro::{M_DRY_AIR, M_WATER, validation};

/// CoolProp backend: humid air from the ASHRAE RP-1485 mixture model and
/// water from the IAPWS-95 equation of state.
///
/// Only water vapour in dry air is supported.
///
/// Thread-safe: rfluids instances are created per query and never shared.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoolPropModel {}

impl CoolPropModel {
    pub fn new() -> Self {
        Self {}
    }

    /// Humid air at (P, T) with the vapour content given as a mole fraction.
    fn humid_air_at(&self, p: f64, t: f64, x1: f64) -> PropsResult<HumidAir> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let w = humidity_ratio(x1)?;
        HumidAir::new()
            .in_state(
                HumidAirInput::pressure(p),
                HumidAirInput::temperature(t),
                HumidAirInput::abs_humidity(w),
            )
            .map_err(|e| PropsError::Backend {
                message: format!("rfluids error at P={p} Pa, T={t} K, W={w}: {e}"),
            })
    }

    /// Water on the saturation line at `t`, `quality` 0 for liquid and 1 for
    /// vapour.
    fn saturated_water(&self, t: f64, quality: f64) -> PropsResult<Fluid> {
        validation::validate_temperature(t)?;
        Fluid::from(Pure::Water)
            .in_state(FluidInput::temperature(t), FluidInput::quality(quality))
            .map_err(|e| PropsError::Backend {
                message: format!("rfluids error for water at T={t} K, Q={quality}: {e}"),
            })
    }
}

impl PropertyModel for CoolPropModel {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn density(&self, p: f64, t: f64, x1: f64) -> PropsResult<f64> {
        let mut air = self.humid_air_at(p, t, x1)?;
        let rho = air.density().map_err(|e| PropsError::Backend {
            message: format!("rfluids error getting humid-air density: {e}"),
        })?;
        validation::validate_positive(rho, "humid-air density")?;
        Ok(rho)
    }

    fn humid_air(&self, p: f64, t: f64, x1: f64) -> PropsResult<AirProperties> {
        // One state, all four properties.
        let mut air = self.humid_air_at(p, t, x1)?;
        let rho = air.density().map_err(|e| PropsError::Backend {
            message: format!("rfluids error getting humid-air density: {e}"),
        })?;
        let cp = air.specific_heat().map_err(|e| PropsError::Backend {
            message: format!("rfluids error getting humid-air specific heat: {e}"),
        })?;
        let k = air.conductivity().map_err(|e| PropsError::Backend {
            message: format!("rfluids error getting humid-air conductivity: {e}"),
        })?;
        let mu = air.dynamic_viscosity().map_err(|e| PropsError::Backend {
            message: format!("rfluids error getting humid-air viscosity: {e}"),
        })?;
        AirProperties { rho, cp, k, mu }.validate()
    }

    fn latent_heat(&self, t: f64) -> PropsResult<f64> {
        let h_g = self
            .saturated_water(t, 1.0)?
            .enthalpy()
            .map_err(|e| PropsError::Backend {
                message: format!("rfluids error getting vapour enthalpy: {e}"),
            })?;
        let h_f = self
            .saturated_water(t, 0.0)?
            .enthalpy()
            .map_err(|e| PropsError::Backend {
                message: format!("rfluids error getting liquid enthalpy: {e}"),
            })?;
        let hfg = h_g - h_f;
        validation::validate_positive(hfg, "latent heat")?;
        Ok(hfg)
    }

    fn liquid_specific_heat(&self, t: f64) -> PropsResult<f64> {
        let cpl = self
            .saturated_water(t, 0.0)?
            .specific_heat()
            .map_err(|e| PropsError::Backend {
                message: format!("rfluids error getting liquid specific heat: {e}"),
            })?;
        validation::validate_positive(cpl, "liquid specific heat")?;
        Ok(cpl)
    }
}

/// Humidity ratio W [kg water / kg dry air] from the vapour mole fraction.
fn humidity_ratio(x1: f64) -> PropsResult<f64> {
    validation::validate_fraction(x1, "vapour mole fraction")?;
    if x1 >= 1.0 {
        return Err(PropsError::NonPhysical {
            what: "vapour mole fraction must be below one",
        });
    }
    Ok(M_WATER / M_DRY_AIR * x1 / (1.0 - x1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psychro::{Humidity, PsychrometricProperties};

    const P: f64 = 101_325.0;

    fn close(actual: f64, expected: f64, rel: f64) -> bool {
        ((actual - expected) / expected).abs() < rel
    }

    #[test]
    fn model_name() {
        assert_eq!(CoolPropModel::new().name(), "CoolProp");
    }

    #[test]
    fn humidity_ratio_limits() {
        assert_eq!(humidity_ratio(0.0).unwrap(), 0.0);
        assert!((humidity_ratio(0.01).unwrap() - 0.006_282_616_246_709_6).abs() < 1e-12);
        assert!(humidity_ratio(1.0).is_err());
        assert!(humidity_ratio(-0.1).is_err());
    }

    #[test]
    fn humid_air_reference_state() {
        // P = 101325 Pa, T = 290 K, Tdp = 280 K against HAPropsSI.
        let x1 = PsychrometricProperties::default()
            .vapor_mole_fraction(P, 290.0, Humidity::DewPoint(280.0))
            .unwrap();
        let air = CoolPropModel::new().humid_air(P, 290.0, x1).unwrap();
        assert!(close(air.rho, 1.213_231, 2e-3), "rho = {}", air.rho);
        assert!(close(air.cp, 1017.642, 2e-3), "cp = {}", air.cp);
        assert!(close(air.k, 0.025_633_5, 2e-3), "k = {}", air.k);
        assert!(close(air.mu, 1.800_077e-5, 2e-3), "mu = {}", air.mu);
        let alpha = air.k / (air.rho * air.cp);
        assert!(close(alpha, 2.076_202e-5, 4e-3), "alpha = {alpha}");
    }

    #[test]
    fn saturated_surface_reference_state() {
        // P = 101325 Pa, Ts = 285 K, saturated.
        let x1s = PsychrometricProperties::default()
            .vapor_mole_fraction(P, 285.0, Humidity::Saturated)
            .unwrap();
        let model = CoolPropModel::new();
        let rho = model.density(P, 285.0, x1s).unwrap();
        assert!(close(rho, 1.232_756, 2e-3), "rho_s = {rho}");
        assert_eq!(rho, model.humid_air(P, 285.0, x1s).unwrap().rho);
    }

    #[test]
    fn water_reference_values() {
        let model = CoolPropModel::new();
        assert!(close(model.latent_heat(285.0).unwrap(), 2_472_806.69, 1e-4));
        assert!(close(model.liquid_specific_heat(285.0).unwrap(), 4192.729, 1e-4));
    }

    #[test]
    fn rejects_non_physical_inputs() {
        let model = CoolPropModel::new();
        assert!(matches!(
            model.humid_air(-1.0, 290.0, 0.01),
            Err(PropsError::NonPhysical { .. })
        ));
        assert!(model.density(P, 290.0, 1.0).is_err());
        assert!(model.latent_heat(0.0).is_err());
    }
}
