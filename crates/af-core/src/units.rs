// af-core/src/units.rs

use uom::si::f64::ThermodynamicTemperature as UomThermodynamicTemperature;

// Public canonical unit types (SI, f64)
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn kelvin_of(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

pub mod constants {
    use super::*;

    /// Thermochemical standard reference temperature (K).
    pub const STANDARD_REF_TEMP_K: f64 = 298.15;

    #[inline]
    pub fn standard_ref_temp() -> Temperature {
        k(STANDARD_REF_TEMP_K)
    }
}
