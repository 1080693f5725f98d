//! uom quantities at the crate boundaries.
//!
//! Solvers work on plain SI `f64`; these types appear where states and wall
//! loads are handed out or taken in with explicit units.

use uom::si::f64::{
    Acceleration as UomAcceleration, HeatFluxDensity as UomHeatFlux, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
    Velocity as UomVelocity,
};

pub type Accel = UomAcceleration;
pub type Density = UomMassDensity;
pub type HeatFlux = UomHeatFlux;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn kg_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

/// Heat flux density [W/m²].
#[inline]
pub fn wpm2(v: f64) -> HeatFlux {
    use uom::si::heat_flux_density::watt_per_square_meter;
    HeatFlux::new::<watt_per_square_meter>(v)
}
