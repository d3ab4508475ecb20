//! Film-state model for a liquid surface evaporating into humid air.
//!
//! The solver reduces an averaged experimental state (pressure, ambient and
//! dew-point temperatures, surface temperature) plus a measured evaporation
//! rate to film properties and the dimensionless transfer coefficients.
//! Every output carries an uncertainty obtained by one-at-a-time finite
//! differences over the uncertain inputs.

use core::f64::consts::PI;
use core::fmt;
use std::sync::Arc;

use ef_core::units::constants::{G0_MPS2, STEFAN_BOLTZMANN};
use ef_core::{UncertaintyValue, propagate_many};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coolprop::CoolPropModel;
use crate::correlation::{DiffusionCorrelation, FilmRule, PropertyBackend, SaturationCorrelation};
use crate::error::{PropsError, PropsResult};
use crate::model::{CorrelationModel, PropertyModel};
use crate::psychro::{Humidity, M_DRY_AIR, M_WATER, PsychrometricProperties, validation};

/// Grey-body radiation exchange between the liquid surface and the chamber
/// walls, modelled as a cylindrical enclosure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiationModel {
    pub chamber_emissivity: f64,
    pub surface_emissivity: f64,
    /// Chamber radius [m].
    pub chamber_radius: f64,
    /// Chamber length [m].
    pub chamber_length: f64,
}

impl Default for RadiationModel {
    fn default() -> Self {
        Self {
            chamber_emissivity: 0.1,
            surface_emissivity: 0.99,
            chamber_radius: 0.3,
            chamber_length: 0.7,
        }
    }
}

impl RadiationModel {
    /// Inner wall area of the chamber [m²].
    pub fn chamber_area(&self) -> f64 {
        let rc = self.chamber_radius;
        2.0 * PI * rc * rc + 2.0 * PI * rc * self.chamber_length
    }

    /// Dimensionless factor `F` such that the radiative flux onto a surface
    /// of area `area` is `σ(Te⁴ − Ts⁴) / F`.
    pub fn exchange_factor(&self, area: f64) -> f64 {
        let (ec, es) = (self.chamber_emissivity, self.surface_emissivity);
        area * ((1.0 - ec) / (ec * self.chamber_area()) + 1.0 / area + (1.0 - es) / (es * area))
    }

    fn validate(&self) -> PropsResult<()> {
        let emissivity_ok = |e: f64| e.is_finite() && e > 0.0 && e <= 1.0;
        if !emissivity_ok(self.chamber_emissivity) || !emissivity_ok(self.surface_emissivity) {
            return Err(PropsError::Configuration {
                what: "emissivities must lie in (0, 1]",
            });
        }
        if !(self.chamber_radius.is_finite()
            && self.chamber_radius > 0.0
            && self.chamber_length.is_finite()
            && self.chamber_length >= 0.0)
        {
            return Err(PropsError::Configuration {
                what: "chamber geometry must be positive and finite",
            });
        }
        Ok(())
    }
}

/// Film model configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilmConfig {
    /// Radius of the evaporating surface [m].
    pub radius: UncertaintyValue,
    /// Molar mass of the evaporating species [kg/kmol].
    pub m1: f64,
    /// Molar mass of the carrier gas [kg/kmol].
    pub m2: f64,
    pub diffusion: DiffusionCorrelation,
    pub rule: FilmRule,
    pub saturation: SaturationCorrelation,
    /// Where film ρ, cp, k, μ and the water hfg, cpl come from.
    pub properties: PropertyBackend,
    pub radiation: RadiationModel,
    /// Gravitational acceleration [m/s²].
    pub gravity: f64,
}

impl Default for FilmConfig {
    fn default() -> Self {
        Self {
            radius: UncertaintyValue::constant(0.015, 0.0001),
            m1: M_WATER,
            m2: M_DRY_AIR,
            diffusion: DiffusionCorrelation::default(),
            rule: FilmRule::default(),
            saturation: SaturationCorrelation::default(),
            properties: PropertyBackend::default(),
            radiation: RadiationModel::default(),
            gravity: G0_MPS2,
        }
    }
}

impl FilmConfig {
    pub fn validate(&self) -> PropsResult<()> {
        self.validate_physics()?;
        let water_in_air =
            (self.m1 / M_WATER - 1.0).abs() < 1e-3 && (self.m2 / M_DRY_AIR - 1.0).abs() < 1e-3;
        if self.properties == PropertyBackend::CoolProp && !water_in_air {
            return Err(PropsError::Configuration {
                what: "the coolprop backend covers water vapour in air only; use correlations",
            });
        }
        Ok(())
    }

    /// Everything except the choice of property backend.
    fn validate_physics(&self) -> PropsResult<()> {
        if self.radius.nominal() <= 0.0 {
            return Err(PropsError::Configuration {
                what: "surface radius must be positive",
            });
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(PropsError::Configuration {
                what: "gravity must be positive and finite",
            });
        }
        self.radiation.validate()?;
        PsychrometricProperties::new(self.m1, self.m2, self.saturation)?;
        Ok(())
    }

    fn property_model(&self) -> PropsResult<Arc<dyn PropertyModel>> {
        Ok(match self.properties {
            PropertyBackend::CoolProp => Arc::new(CoolPropModel::new()),
            PropertyBackend::Correlations => Arc::new(CorrelationModel::new(
                PsychrometricProperties::new(self.m1, self.m2, self.saturation)?,
            )),
        })
    }
}

/// Averaged experimental conditions over one fit window (SI: Pa, K).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalState {
    pub pressure: UncertaintyValue,
    pub ambient_temperature: UncertaintyValue,
    pub dew_point: UncertaintyValue,
    pub surface_temperature: UncertaintyValue,
}

impl ExperimentalState {
    fn inputs(&self) -> [UncertaintyValue; 4] {
        [
            self.pressure,
            self.ambient_temperature,
            self.dew_point,
            self.surface_temperature,
        ]
    }
}

/// Thermophysical state at the surface (`s`), in the ambient (`e`) and in
/// the film between them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilmState<T = UncertaintyValue> {
    pub film_temperature: T,
    pub x1s: T,
    pub x1e: T,
    pub x1: T,
    pub m1s: T,
    pub m1e: T,
    pub m1: T,
    pub rho_s: T,
    pub rho_e: T,
    pub rho: T,
    pub cp: T,
    pub k: T,
    pub alpha: T,
    pub mu: T,
    pub nu: T,
    pub d12: T,
}

const FILM_LEN: usize = 16;

impl<T: Copy> FilmState<T> {
    fn to_array(&self) -> [T; FILM_LEN] {
        [
            self.film_temperature,
            self.x1s,
            self.x1e,
            self.x1,
            self.m1s,
            self.m1e,
            self.m1,
            self.rho_s,
            self.rho_e,
            self.rho,
            self.cp,
            self.k,
            self.alpha,
            self.mu,
            self.nu,
            self.d12,
        ]
    }

    fn from_array(a: [T; FILM_LEN]) -> Self {
        let [
            film_temperature,
            x1s,
            x1e,
            x1,
            m1s,
            m1e,
            m1,
            rho_s,
            rho_e,
            rho,
            cp,
            k,
            alpha,
            mu,
            nu,
            d12,
        ] = a;
        Self {
            film_temperature,
            x1s,
            x1e,
            x1,
            m1s,
            m1e,
            m1,
            rho_s,
            rho_e,
            rho,
            cp,
            k,
            alpha,
            mu,
            nu,
            d12,
        }
    }
}

/// Energy balance terms and dimensionless transfer groups.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferNumbers<T = UncertaintyValue> {
    /// Evaporative mass flux ṁ'' [kg/(m²·s)].
    pub mass_flux: T,
    /// Mass-transfer driving force.
    pub bm1: T,
    /// Latent heat at the surface temperature [J/kg].
    pub hfg: T,
    /// Liquid specific heat [J/(kg·K)].
    pub cpl: T,
    /// Convective heat flux into the surface [W/m²].
    pub q_cu: T,
    /// Radiative heat flux into the surface [W/m²].
    pub q_rs: T,
    /// Heat-transfer driving force.
    pub bh: T,
    pub sh_r: T,
    pub nu_r: T,
    pub le: T,
    pub gr_binary: T,
    pub gr_r: T,
}

const TRANSFER_LEN: usize = 12;

impl<T: Copy> TransferNumbers<T> {
    fn to_array(&self) -> [T; TRANSFER_LEN] {
        [
            self.mass_flux,
            self.bm1,
            self.hfg,
            self.cpl,
            self.q_cu,
            self.q_rs,
            self.bh,
            self.sh_r,
            self.nu_r,
            self.le,
            self.gr_binary,
            self.gr_r,
        ]
    }

    fn from_array(a: [T; TRANSFER_LEN]) -> Self {
        let [
            mass_flux,
            bm1,
            hfg,
            cpl,
            q_cu,
            q_rs,
            bh,
            sh_r,
            nu_r,
            le,
            gr_binary,
            gr_r,
        ] = a;
        Self {
            mass_flux,
            bm1,
            hfg,
            cpl,
            q_cu,
            q_rs,
            bh,
            sh_r,
            nu_r,
            le,
            gr_binary,
            gr_r,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilmSolution {
    pub state: FilmState,
    pub transfer: TransferNumbers,
}

/// `Bm1 = (m1s − m1e) / (1 − m1s)`.
pub fn mass_transfer_number(m1s: f64, m1e: f64) -> PropsResult<f64> {
    if m1s.is_nan() || m1s >= 1.0 {
        return Err(PropsError::NonPhysical {
            what: "surface mass fraction must be below one",
        });
    }
    Ok((m1s - m1e) / (1.0 - m1s))
}

/// Single-pass film-state solver.
#[derive(Clone)]
pub struct FilmStateSolver {
    config: FilmConfig,
    props: PsychrometricProperties,
    model: Arc<dyn PropertyModel>,
}

impl fmt::Debug for FilmStateSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilmStateSolver")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish()
    }
}

impl FilmStateSolver {
    /// Solver with the property backend named in `config`.
    pub fn new(config: FilmConfig) -> PropsResult<Self> {
        config.validate()?;
        let model = config.property_model()?;
        Self::with_model(config, model)
    }

    /// Solver with a caller-supplied property model; `config.properties`
    /// is ignored.
    pub fn with_model(config: FilmConfig, model: Arc<dyn PropertyModel>) -> PropsResult<Self> {
        config.validate_physics()?;
        let props = PsychrometricProperties::new(config.m1, config.m2, config.saturation)?;
        Ok(Self { config, props, model })
    }

    pub fn config(&self) -> &FilmConfig {
        &self.config
    }

    /// Saturation and composition relations.
    pub fn properties(&self) -> &PsychrometricProperties {
        &self.props
    }

    pub fn model(&self) -> &dyn PropertyModel {
        self.model.as_ref()
    }

    /// Film properties for the given state, with propagated uncertainty.
    pub fn film_state(&self, exp: &ExperimentalState) -> PropsResult<FilmState> {
        let out = propagate_many(&exp.inputs(), |x: &[f64; 4]| {
            let [p, te, tdp, ts] = *x;
            self.film_chain(p, te, tdp, ts).map(|f| f.to_array())
        })?;
        Ok(FilmState::from_array(out))
    }

    /// Re-evaluates the film with the surface temperature replaced by
    /// `surface_guess`. Iterating on the guess is left to the caller.
    pub fn refine(
        &self,
        surface_guess: UncertaintyValue,
        exp: &ExperimentalState,
    ) -> PropsResult<FilmState> {
        let guessed = ExperimentalState {
            surface_temperature: surface_guess,
            ..*exp
        };
        self.film_state(&guessed)
    }

    /// Full reduction of one window: film state plus transfer numbers for an
    /// evaporation rate `mass_flow` [kg/s] (positive when evaporating).
    pub fn evaluate(
        &self,
        exp: &ExperimentalState,
        mass_flow: UncertaintyValue,
    ) -> PropsResult<FilmSolution> {
        let [p, te, tdp, ts] = exp.inputs();
        let inputs = [p, te, tdp, ts, self.config.radius, mass_flow];

        let out = propagate_many(&inputs, |x: &[f64; 6]| {
            let [p, te, tdp, ts, r, mdot] = *x;
            let film = self.film_chain(p, te, tdp, ts)?;
            let transfer = self.transfer_chain(&film, te, ts, r, mdot)?;
            let mut all = [0.0; FILM_LEN + TRANSFER_LEN];
            all[..FILM_LEN].copy_from_slice(&film.to_array());
            all[FILM_LEN..].copy_from_slice(&transfer.to_array());
            Ok::<_, PropsError>(all)
        })?;

        let state = FilmState::from_array(core::array::from_fn(|i| out[i]));
        let transfer = TransferNumbers::from_array(core::array::from_fn(|i| out[FILM_LEN + i]));
        debug!(
            model = self.model.name(),
            t_film = state.film_temperature.nominal(),
            bm1 = transfer.bm1.nominal(),
            sh_r = transfer.sh_r.nominal(),
            "film evaluated"
        );
        Ok(FilmSolution { state, transfer })
    }

    fn film_chain(&self, p: f64, te: f64, tdp: f64, ts: f64) -> PropsResult<FilmState<f64>> {
        let props = &self.props;
        let rule = self.config.rule;

        let x1s = props.vapor_mole_fraction(p, ts, Humidity::Saturated)?;
        let x1e = props.vapor_mole_fraction(p, te, Humidity::DewPoint(tdp))?;
        let m1s = props.mass_fraction(x1s);
        let m1e = props.mass_fraction(x1e);
        let rho_s = self.model.density(p, ts, x1s)?;
        let rho_e = self.model.density(p, te, x1e)?;

        let film_temperature = rule.apply(te, ts);
        let x1 = rule.apply(x1e, x1s);
        let m1 = rule.apply(m1e, m1s);
        let air = self.model.humid_air(p, film_temperature, x1)?;
        let (rho, cp, k, mu) = (air.rho, air.cp, air.k, air.mu);
        let alpha = k / (rho * cp);
        let nu = mu / rho;
        let d12 = props.binary_diffusion(p, film_temperature, self.config.diffusion)?;

        let state = FilmState {
            film_temperature,
            x1s,
            x1e,
            x1,
            m1s,
            m1e,
            m1,
            rho_s,
            rho_e,
            rho,
            cp,
            k,
            alpha,
            mu,
            nu,
            d12,
        };
        ensure_all_finite(&state.to_array(), "film state")?;
        Ok(state)
    }

    fn transfer_chain(
        &self,
        film: &FilmState<f64>,
        te: f64,
        ts: f64,
        r: f64,
        mdot: f64,
    ) -> PropsResult<TransferNumbers<f64>> {
        validation::validate_positive(r, "surface radius")?;
        let area = PI * r * r;
        let mass_flux = mdot / area;

        let bm1 = mass_transfer_number(film.m1s, film.m1e)?;
        let ln_bm1 = ln_one_plus(bm1, "1 + Bm1 must be positive")?;

        // Enthalpies relative to saturated liquid at the surface.
        let hfg = self.model.latent_heat(ts)?;
        let cpl = self.model.liquid_specific_heat(film.film_temperature)?;
        let h_u = -hfg;
        let h_s = 0.0;
        let h_e = film.cp * (te - ts);
        let h_t = cpl * (te - ts);
        let q_cu = mass_flux * (h_t - h_u);
        let q_rs = STEFAN_BOLTZMANN * (te.powi(4) - ts.powi(4))
            / self.config.radiation.exchange_factor(area);
        let bh = (h_s - h_e) / (h_u + (q_cu + q_rs) / mass_flux - h_s);
        let ln_bh = ln_one_plus(bh, "1 + Bh must be positive")?;

        let sh_r = mass_flux * r / (ln_bm1 * film.rho * film.d12);
        let nu_r = mass_flux * r / (ln_bh * film.rho * film.alpha);
        let le = film.d12 / film.alpha;

        let g = self.config.gravity;
        // Mass-fraction weighted mixture molar mass.
        let molar_mass = film.m1 * self.config.m1 + (1.0 - film.m1) * self.config.m2;
        let gamma1 = (molar_mass / self.config.m1 - 1.0) / film.rho;
        let beta = 1.0 / film.film_temperature;
        let r3 = r.powi(3);
        let gr_binary = g * r3 / film.nu.powi(2)
            * (beta * (ts - te) + gamma1 * film.rho * (film.m1s - film.m1e));
        let gr_r = g * r3 / film.mu.powi(2) * film.rho * (film.rho_s - film.rho_e);

        let transfer = TransferNumbers {
            mass_flux,
            bm1,
            hfg,
            cpl,
            q_cu,
            q_rs,
            bh,
            sh_r,
            nu_r,
            le,
            gr_binary,
            gr_r,
        };
        ensure_all_finite(&transfer.to_array(), "transfer numbers")?;
        Ok(transfer)
    }
}

fn ln_one_plus(b: f64, what: &'static str) -> PropsResult<f64> {
    if b.is_nan() || 1.0 + b <= 0.0 {
        return Err(PropsError::NonPhysical { what });
    }
    Ok(b.ln_1p())
}

fn ensure_all_finite(values: &[f64], what: &'static str) -> PropsResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(PropsError::NonPhysical { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv(n: f64, s: f64) -> UncertaintyValue {
        UncertaintyValue::new(n, s).unwrap()
    }

    fn exact_state(ts: f64) -> ExperimentalState {
        ExperimentalState {
            pressure: UncertaintyValue::exact(101_325.0),
            ambient_temperature: UncertaintyValue::exact(290.0),
            dew_point: UncertaintyValue::exact(280.0),
            surface_temperature: UncertaintyValue::exact(ts),
        }
    }

    #[test]
    fn default_radiation_factor() {
        let area = PI * 0.015 * 0.015;
        let f = RadiationModel::default().exchange_factor(area);
        // A small surface in a large enclosure sees it as nearly black.
        assert!(f > 1.0 && f < 1.02, "F = {f}");
    }

    #[test]
    fn mass_transfer_number_limits() {
        assert_eq!(mass_transfer_number(0.01, 0.01).unwrap(), 0.0);
        assert!((mass_transfer_number(0.02, 0.01).unwrap() - 0.01 / 0.98).abs() < 1e-15);
        assert!(mass_transfer_number(1.0, 0.01).is_err());
    }

    #[test]
    fn film_temperature_follows_rule() {
        let mean = FilmStateSolver::new(FilmConfig::default()).unwrap();
        let third = FilmStateSolver::new(FilmConfig {
            rule: FilmRule::OneThird,
            ..FilmConfig::default()
        })
        .unwrap();
        let exp = exact_state(284.0);
        assert!((mean.film_state(&exp).unwrap().film_temperature.nominal() - 287.0).abs() < 1e-12);
        assert!((third.film_state(&exp).unwrap().film_temperature.nominal() - 286.0).abs() < 1e-12);
    }

    #[test]
    fn exact_inputs_give_exact_outputs() {
        let solver = FilmStateSolver::new(FilmConfig {
            radius: UncertaintyValue::exact(0.015),
            ..FilmConfig::default()
        })
        .unwrap();
        let sol = solver
            .evaluate(&exact_state(285.0), UncertaintyValue::exact(1e-7))
            .unwrap();
        assert!(sol.state.to_array().iter().all(|v| v.sigma() == 0.0));
        assert!(sol.transfer.to_array().iter().all(|v| v.sigma() == 0.0));
    }

    #[test]
    fn binary_grashof_uses_mass_weighted_molar_mass() {
        let solver = FilmStateSolver::new(FilmConfig::default()).unwrap();
        let sol = solver
            .evaluate(&exact_state(285.0), UncertaintyValue::exact(1e-7))
            .unwrap();
        let st = &sol.state;
        let (m1, m2) = (M_WATER, M_DRY_AIR);
        let (rho, nu) = (st.rho.nominal(), st.nu.nominal());
        let dm = st.m1s.nominal() - st.m1e.nominal();
        let r3 = 0.015_f64.powi(3);
        let grashof = |molar_mass: f64| {
            let gamma1 = (molar_mass / m1 - 1.0) / rho;
            G0_MPS2 * r3 / (nu * nu)
                * (-5.0 / st.film_temperature.nominal() + gamma1 * rho * dm)
        };

        let by_mass = grashof(st.m1.nominal() * m1 + (1.0 - st.m1.nominal()) * m2);
        let by_mole = grashof(st.x1.nominal() * m1 + (1.0 - st.x1.nominal()) * m2);
        let gr = sol.transfer.gr_binary.nominal();
        assert!(((gr - by_mass) / by_mass).abs() < 1e-9, "{gr} vs {by_mass}");
        assert!(((gr - by_mole) / by_mole).abs() > 1e-5);
    }

    #[test]
    fn surface_at_dew_point_is_rejected() {
        // Bm1 = 0 makes ln(1 + Bm1) vanish.
        let solver = FilmStateSolver::new(FilmConfig::default()).unwrap();
        let res = solver.evaluate(&exact_state(280.0), uv(1e-7, 1e-9));
        assert!(matches!(res, Err(PropsError::NonPhysical { .. })));
    }

    #[test]
    fn zero_mass_flow_is_rejected() {
        let solver = FilmStateSolver::new(FilmConfig::default()).unwrap();
        let res = solver.evaluate(&exact_state(285.0), UncertaintyValue::exact(0.0));
        assert!(matches!(res, Err(PropsError::NonPhysical { .. })));
    }

    #[test]
    fn coolprop_backend_is_limited_to_water_in_air() {
        let ethanol = FilmConfig {
            m1: 46.07,
            ..FilmConfig::default()
        };
        assert!(FilmStateSolver::new(ethanol.clone()).unwrap_err().is_configuration());

        let closed_form = FilmConfig {
            properties: PropertyBackend::Correlations,
            ..ethanol
        };
        let solver = FilmStateSolver::new(closed_form).unwrap();
        assert_eq!(solver.model().name(), "correlations");
    }

    #[test]
    fn injected_model_is_used() {
        let config = FilmConfig::default();
        let model: Arc<dyn PropertyModel> =
            Arc::new(CorrelationModel::new(PsychrometricProperties::default()));
        let injected = FilmStateSolver::with_model(config.clone(), model).unwrap();
        let selected = FilmStateSolver::new(FilmConfig {
            properties: PropertyBackend::Correlations,
            ..config
        })
        .unwrap();
        let exp = exact_state(285.0);
        assert_eq!(injected.film_state(&exp).unwrap(), selected.film_state(&exp).unwrap());
        assert_eq!(FilmStateSolver::new(FilmConfig::default()).unwrap().model().name(), "CoolProp");
    }

    #[test]
    fn invalid_configs() {
        let bad_radius = FilmConfig {
            radius: UncertaintyValue::exact(0.0),
            ..FilmConfig::default()
        };
        assert!(FilmStateSolver::new(bad_radius).unwrap_err().is_configuration());

        let bad_emissivity = FilmConfig {
            radiation: RadiationModel {
                chamber_emissivity: 0.0,
                ..RadiationModel::default()
            },
            ..FilmConfig::default()
        };
        assert!(bad_emissivity.validate().unwrap_err().is_configuration());
    }
}
