//! ef-core: stable foundation for evapfit.
//!
//! Contains:
//! - uncertainty (value ± sigma arithmetic and the finite-difference propagator)
//! - units (uom SI types, constructors, physical constants)
//! - error (shared error types)

pub mod error;
pub mod uncertainty;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use uncertainty::{UncertaintyValue, mean, propagate, propagate_many};
