//! ef-props: humid-air properties and the film-state model for evapfit.
//!
//! Provides:
//! - Psychrometric relations for water vapour in air (saturation pressure,
//!   mole/mass fractions, density, specific heat, transport properties)
//! - `PropertyModel` backends for the film properties: CoolProp through
//!   `rfluids` (default) or the closed-form correlations
//! - Selectable correlations for diffusion and saturation, and the film
//!   averaging rule
//! - `FilmStateSolver`, which turns an averaged experimental state and an
//!   evaporation rate into film properties and transfer numbers
//!
//! # Example
//!
//! ```no_run
//! use ef_core::UncertaintyValue;
//! use ef_props::{ExperimentalState, FilmConfig, FilmStateSolver};
//!
//! let solver = FilmStateSolver::new(FilmConfig::default()).unwrap();
//! let exp = ExperimentalState {
//!     pressure: UncertaintyValue::new(101_325.0, 150.0).unwrap(),
//!     ambient_temperature: UncertaintyValue::new(290.0, 0.1).unwrap(),
//!     dew_point: UncertaintyValue::new(280.0, 0.2).unwrap(),
//!     surface_temperature: UncertaintyValue::new(285.0, 0.5).unwrap(),
//! };
//! let mdot = UncertaintyValue::new(1e-7, 1e-9).unwrap();
//! let solution = solver.evaluate(&exp, mdot).unwrap();
//! println!("ShR = {}", solution.transfer.sh_r);
//! ```

pub mod coolprop;
pub mod correlation;
pub mod error;
pub mod film;
pub mod model;
pub mod psychro;

pub use coolprop::CoolPropModel;
pub use correlation::{DiffusionCorrelation, FilmRule, PropertyBackend, SaturationCorrelation};
pub use error::{PropsError, PropsResult};
pub use film::{
    ExperimentalState, FilmConfig, FilmSolution, FilmState, FilmStateSolver, RadiationModel,
    TransferNumbers, mass_transfer_number,
};
pub use model::{AirProperties, CorrelationModel, PropertyModel};
pub use psychro::{
    Humidity, M_DRY_AIR, M_WATER, PsychrometricProperties, latent_heat, liquid_specific_heat,
};
