//! Psychrometric properties of humid air.
//!
//! Humid air is treated as an ideal mixture of water vapour (species 1) and
//! dry air (species 2). Inputs and outputs are plain SI `f64` values so the
//! functions can be driven directly by the finite-difference propagator:
//! pressure in Pa, temperature in K, molar mass in kg/kmol.

use ef_core::units::CELSIUS_OFFSET;
use ef_core::units::constants::R_UNIVERSAL;

use crate::correlation::{DiffusionCorrelation, SaturationCorrelation};
use crate::error::{PropsError, PropsResult};

/// Molar mass of water [kg/kmol].
pub const M_WATER: f64 = 18.015;

/// Molar mass of dry air [kg/kmol].
pub const M_DRY_AIR: f64 = 28.964;

/// How the vapour content of a state is specified.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Humidity {
    /// Saturated at the state temperature.
    Saturated,
    /// Dew-point temperature [K].
    DewPoint(f64),
    /// Vapour mole fraction given directly.
    MoleFraction(f64),
}

/// Property evaluator for one vapour/carrier pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PsychrometricProperties {
    /// Molar mass of the transferring species [kg/kmol].
    pub m1: f64,
    /// Molar mass of the carrier gas [kg/kmol].
    pub m2: f64,
    pub saturation: SaturationCorrelation,
}

impl Default for PsychrometricProperties {
    fn default() -> Self {
        Self {
            m1: M_WATER,
            m2: M_DRY_AIR,
            saturation: SaturationCorrelation::default(),
        }
    }
}

impl PsychrometricProperties {
    pub fn new(m1: f64, m2: f64, saturation: SaturationCorrelation) -> PropsResult<Self> {
        if !(m1.is_finite() && m1 > 0.0 && m2.is_finite() && m2 > 0.0) {
            return Err(PropsError::Configuration {
                what: "molar masses must be positive and finite",
            });
        }
        Ok(Self { m1, m2, saturation })
    }

    /// Saturation vapour pressure [Pa] at temperature `t`.
    pub fn saturation_pressure(&self, t: f64) -> PropsResult<f64> {
        validation::validate_temperature(t)?;
        let (lo, hi) = self.saturation.range();
        if t < lo || t > hi {
            return Err(PropsError::OutOfRange {
                what: "saturation temperature",
                value: t,
            });
        }
        let p_sat = match self.saturation {
            SaturationCorrelation::HylandWexler => hyland_wexler(t),
            SaturationCorrelation::Magnus => {
                let tc = t - CELSIUS_OFFSET;
                610.94 * (17.625 * tc / (tc + 243.04)).exp()
            }
        };
        validation::validate_positive(p_sat, "saturation pressure")?;
        Ok(p_sat)
    }

    /// Vapour mole fraction x1 at total pressure `p` and temperature `t`.
    pub fn vapor_mole_fraction(&self, p: f64, t: f64, humidity: Humidity) -> PropsResult<f64> {
        validation::validate_pressure(p)?;
        let p_vapor = match humidity {
            Humidity::Saturated => self.saturation_pressure(t)?,
            Humidity::DewPoint(t_dp) => {
                validation::validate_temperature(t)?;
                self.saturation_pressure(t_dp)?
            }
            Humidity::MoleFraction(x1) => {
                validation::validate_temperature(t)?;
                validation::validate_fraction(x1, "vapour mole fraction")?;
                x1 * p
            }
        };
        let x1 = p_vapor / p;
        if x1 >= 1.0 {
            return Err(PropsError::NonPhysical {
                what: "vapour pressure exceeds total pressure",
            });
        }
        Ok(x1)
    }

    /// Mass fraction m1 from mole fraction x1.
    pub fn mass_fraction(&self, x1: f64) -> f64 {
        let num = self.m1 * x1;
        num / (num + self.m2 * (1.0 - x1))
    }

    /// Mixture molar mass [kg/kmol].
    pub fn molar_mass(&self, x1: f64) -> f64 {
        x1 * self.m1 + (1.0 - x1) * self.m2
    }

    /// Mixture density [kg/m³], the inverse of the specific volume
    /// `v = R̄·T / (P·M̄)`.
    pub fn density(&self, p: f64, t: f64, x1: f64) -> PropsResult<f64> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        validation::validate_fraction(x1, "vapour mole fraction")?;
        let v = R_UNIVERSAL * t / (p * self.molar_mass(x1));
        Ok(1.0 / v)
    }

    /// Mixture specific heat at constant pressure [J/(kg·K)], mass weighted.
    pub fn specific_heat(&self, t: f64, x1: f64) -> PropsResult<f64> {
        validation::validate_temperature(t)?;
        validation::validate_fraction(x1, "vapour mole fraction")?;
        let m1 = self.mass_fraction(x1);
        Ok(m1 * vapor_cp(t) + (1.0 - m1) * dry_air_cp(t))
    }

    /// Mixture dynamic viscosity [Pa·s], Wilke mixing rule.
    pub fn viscosity(&self, t: f64, x1: f64) -> PropsResult<f64> {
        validation::validate_temperature(t)?;
        validation::validate_fraction(x1, "vapour mole fraction")?;
        let (mu1, mu2) = (vapor_viscosity(t), dry_air_viscosity(t));
        Ok(self.wilke_mix(x1, mu1, mu2, mu1, mu2))
    }

    /// Mixture thermal conductivity [W/(m·K)], Wassiljewa form with the
    /// Mason–Saxena interaction factors.
    pub fn thermal_conductivity(&self, t: f64, x1: f64) -> PropsResult<f64> {
        validation::validate_temperature(t)?;
        validation::validate_fraction(x1, "vapour mole fraction")?;
        let (mu1, mu2) = (vapor_viscosity(t), dry_air_viscosity(t));
        let (k1, k2) = (vapor_conductivity(t), dry_air_conductivity(t));
        Ok(self.wilke_mix(x1, k1, k2, mu1, mu2))
    }

    /// Thermal diffusivity `k / (ρ·cp)` [m²/s].
    pub fn thermal_diffusivity(&self, p: f64, t: f64, x1: f64) -> PropsResult<f64> {
        let k = self.thermal_conductivity(t, x1)?;
        let rho = self.density(p, t, x1)?;
        let cp = self.specific_heat(t, x1)?;
        Ok(k / (rho * cp))
    }

    /// Binary diffusion coefficient D12 [m²/s].
    pub fn binary_diffusion(
        &self,
        p: f64,
        t: f64,
        correlation: DiffusionCorrelation,
    ) -> PropsResult<f64> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        Ok(correlation.d12(p, t))
    }

    fn wilke_mix(&self, x1: f64, prop1: f64, prop2: f64, mu1: f64, mu2: f64) -> f64 {
        let x2 = 1.0 - x1;
        let phi12 = wilke_phi(mu1, mu2, self.m1, self.m2);
        let phi21 = wilke_phi(mu2, mu1, self.m2, self.m1);
        let mut mix = 0.0;
        if x1 > 0.0 {
            mix += x1 * prop1 / (x1 + x2 * phi12);
        }
        if x2 > 0.0 {
            mix += x2 * prop2 / (x2 + x1 * phi21);
        }
        mix
    }
}

/// Latent heat of vaporization of water [J/kg] at `t` [K].
pub fn latent_heat(t: f64) -> f64 {
    2.501e6 - 2.361e3 * (t - CELSIUS_OFFSET)
}

/// Specific heat of liquid water [J/(kg·K)] at `t` [K], valid 0–100 °C.
pub fn liquid_specific_heat(t: f64) -> f64 {
    let tc = t - CELSIUS_OFFSET;
    4217.4 - 3.720_283 * tc + 0.141_285_5 * tc.powi(2) - 2.654_387e-3 * tc.powi(3)
        + 2.093_236e-5 * tc.powi(4)
}

fn hyland_wexler(t: f64) -> f64 {
    let ln_p = if t < CELSIUS_OFFSET {
        -5.674_535_9e3 / t + 6.392_524_7 - 9.677_843e-3 * t + 6.221_570_1e-7 * t.powi(2)
            + 2.074_782_5e-9 * t.powi(3)
            - 9.484_024e-13 * t.powi(4)
            + 4.163_501_9 * t.ln()
    } else {
        -5.800_220_6e3 / t + 1.391_499_3 - 4.864_023_9e-2 * t + 4.176_476_8e-5 * t.powi(2)
            - 1.445_209_3e-8 * t.powi(3)
            + 6.545_967_3 * t.ln()
    };
    ln_p.exp()
}

fn wilke_phi(mu_i: f64, mu_j: f64, m_i: f64, m_j: f64) -> f64 {
    let num = (1.0 + (mu_i / mu_j).sqrt() * (m_j / m_i).powf(0.25)).powi(2);
    num / (8.0 * (1.0 + m_i / m_j)).sqrt()
}

fn sutherland(t: f64, ref_value: f64, t_ref: f64, s: f64) -> f64 {
    ref_value * (t / t_ref).powf(1.5) * (t_ref + s) / (t + s)
}

fn dry_air_cp(t: f64) -> f64 {
    1002.5 + 275e-6 * (t - 200.0).powi(2)
}

fn vapor_cp(t: f64) -> f64 {
    1859.0 + 0.13 * (t - CELSIUS_OFFSET)
}

fn dry_air_viscosity(t: f64) -> f64 {
    sutherland(t, 1.716e-5, 273.15, 110.4)
}

fn vapor_viscosity(t: f64) -> f64 {
    sutherland(t, 1.12e-5, 350.0, 1064.0)
}

fn dry_air_conductivity(t: f64) -> f64 {
    sutherland(t, 0.0241, 273.15, 194.0)
}

fn vapor_conductivity(t: f64) -> f64 {
    0.0186 + 8.0e-5 * (t - 300.0)
}

/// Validation helpers for property inputs.
pub(crate) mod validation {
    use super::*;

    pub fn validate_pressure(p: f64) -> PropsResult<()> {
        validate_positive(p, "pressure must be positive and finite")
    }

    pub fn validate_temperature(t: f64) -> PropsResult<()> {
        validate_positive(t, "temperature must be positive and finite")
    }

    pub fn validate_positive(v: f64, what: &'static str) -> PropsResult<()> {
        if !v.is_finite() || v <= 0.0 {
            return Err(PropsError::NonPhysical { what });
        }
        Ok(())
    }

    pub fn validate_fraction(v: f64, what: &'static str) -> PropsResult<()> {
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(PropsError::OutOfRange { what, value: v });
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn d12_is_continuous(t in 250.0_f64..350.0, p in 5e4_f64..2e5) {
            let props = PsychrometricProperties::default();
            for corr in [DiffusionCorrelation::Mills, DiffusionCorrelation::Marrero] {
                let d = props.binary_diffusion(p, t, corr).unwrap();
                let d_eps = props.binary_diffusion(p, t + 1e-6, corr).unwrap();
                prop_assert!(d_eps > d);
                prop_assert!((d_eps - d) / d < 1e-7);
            }
        }

        #[test]
        fn mass_fraction_is_a_fraction(x1 in 0.0_f64..=1.0) {
            let m1 = PsychrometricProperties::default().mass_fraction(x1);
            prop_assert!((0.0..=1.0).contains(&m1));
        }
    }
}
