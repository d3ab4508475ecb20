//! uom SI quantities for raw sensor readings, plus the plain-`f64`
//! constants the property correlations work in.

use uom::si::f64::ThermodynamicTemperature;

pub use uom::si::f64::{Mass, Pressure};
pub type Temperature = ThermodynamicTemperature;

/// Offset between the Celsius and Kelvin scales.
pub const CELSIUS_OFFSET: f64 = 273.15;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

pub mod constants {
    /// Universal gas constant [J/(kmol·K)].
    pub const R_UNIVERSAL: f64 = 8_314.462_618;

    /// Stefan–Boltzmann constant [W/(m²·K⁴)].
    pub const STEFAN_BOLTZMANN: f64 = 5.670_367_13e-8;

    /// Reference pressure of the diffusion correlations [Pa].
    pub const P_ATM: f64 = 101_325.0;

    pub const G0_MPS2: f64 = 9.81;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_si_base_values() {
        assert_eq!(pa(101_325.0).value, 101_325.0);
        assert_eq!(k(290.0).value, 290.0);
        assert_eq!(kg(0.1).value, 0.1);
    }
}
