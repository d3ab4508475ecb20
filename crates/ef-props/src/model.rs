//! Property model trait for the film calculation.
//!
//! The film solver needs humid-air properties at three states (surface,
//! ambient, film) and saturated liquid-water properties. Both come through
//! [`PropertyModel`] so the backend can be chosen at configuration time.

use crate::error::PropsResult;
use crate::psychro::{self, PsychrometricProperties, validation};

/// Humid-air properties at one (P, T, x1) state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AirProperties {
    /// Density of the humid air [kg/m³].
    pub rho: f64,
    /// Specific heat per unit mass of humid air [J/(kg·K)].
    pub cp: f64,
    /// Thermal conductivity [W/(m·K)].
    pub k: f64,
    /// Dynamic viscosity [Pa·s].
    pub mu: f64,
}

impl AirProperties {
    pub(crate) fn validate(self) -> PropsResult<Self> {
        validation::validate_positive(self.rho, "humid-air density")?;
        validation::validate_positive(self.cp, "humid-air specific heat")?;
        validation::validate_positive(self.k, "humid-air conductivity")?;
        validation::validate_positive(self.mu, "humid-air viscosity")?;
        Ok(self)
    }
}

/// Trait for humid-air and liquid-water property models.
///
/// Implementations must be thread-safe (Send + Sync); batch extraction
/// shares one model across worker threads. Pressures are in Pa,
/// temperatures in K and `x1` is the vapour mole fraction.
pub trait PropertyModel: Send + Sync {
    /// Model name for logging.
    fn name(&self) -> &str;

    /// Humid-air density only.
    fn density(&self, p: f64, t: f64, x1: f64) -> PropsResult<f64>;

    /// Density, specific heat and transport properties of humid air.
    fn humid_air(&self, p: f64, t: f64, x1: f64) -> PropsResult<AirProperties>;

    /// Latent heat of vaporization of water at `t` [J/kg].
    fn latent_heat(&self, t: f64) -> PropsResult<f64>;

    /// Specific heat of saturated liquid water at `t` [J/(kg·K)].
    fn liquid_specific_heat(&self, t: f64) -> PropsResult<f64>;
}

/// Closed-form psychrometric correlations.
///
/// Pure Rust and valid for any vapour/carrier molar masses, at the cost of
/// about a percent against the reference equations of state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CorrelationModel {
    props: PsychrometricProperties,
}

impl CorrelationModel {
    pub fn new(props: PsychrometricProperties) -> Self {
        Self { props }
    }
}

impl PropertyModel for CorrelationModel {
    fn name(&self) -> &str {
        "correlations"
    }

    fn density(&self, p: f64, t: f64, x1: f64) -> PropsResult<f64> {
        self.props.density(p, t, x1)
    }

    fn humid_air(&self, p: f64, t: f64, x1: f64) -> PropsResult<AirProperties> {
        AirProperties {
            rho: self.props.density(p, t, x1)?,
            cp: self.props.specific_heat(t, x1)?,
            k: self.props.thermal_conductivity(t, x1)?,
            mu: self.props.viscosity(t, x1)?,
        }
        .validate()
    }

    fn latent_heat(&self, t: f64) -> PropsResult<f64> {
        validation::validate_temperature(t)?;
        let hfg = psychro::latent_heat(t);
        validation::validate_positive(hfg, "latent heat")?;
        Ok(hfg)
    }

    fn liquid_specific_heat(&self, t: f64) -> PropsResult<f64> {
        validation::validate_temperature(t)?;
        let cpl = psychro::liquid_specific_heat(t);
        validation::validate_positive(cpl, "liquid specific heat")?;
        Ok(cpl)
    }
}
