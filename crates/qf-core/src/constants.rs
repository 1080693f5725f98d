//! Immutable physical constants and wall-law coefficients.

use crate::units::Accel;

/// Standard gravity [m/s²].
pub const G0_MPS2: f64 = 9.806_65;

/// Universal gas constant [J/(kmol·K)].
pub const R_UNIVERSAL: f64 = 8_314.462_618;

/// Standard-state pressure of the species thermo tables [Pa].
pub const P_REF: f64 = 1.0e5;

/// One standard atmosphere [Pa].
pub const P_ATM: f64 = 101_325.0;

/// Calories to joules.
pub const CAL_TO_J: f64 = 4.184;

/// von Kármán constant.
pub const KARMAN: f64 = 0.41;

/// Smooth-wall log-law intercept `B⁺₀`.
pub const B_PLUS_SMOOTH: f64 = 5.0;

/// Roughness constant `C_R` in `B⁺ = B⁺₀ − ln(1 + k⁺/C_R)/κ`.
pub const ROUGHNESS_C_R: f64 = 3.4;

/// Initial Coles wake parameter `Π`.
pub const WAKE_PI_INITIAL: f64 = 0.0;

/// Technical roughness factor: `k_tech = 4.2 · R_a`.
pub const TECHNICAL_ROUGHNESS_FACTOR: f64 = 4.2;

/// Far-field turbulent Prandtl number for Kays–Crawford.
pub const PR_T_INF: f64 = 0.85;

#[inline]
pub fn g0() -> Accel {
    use uom::si::acceleration::meter_per_second_squared;
    Accel::new::<meter_per_second_squared>(G0_MPS2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn g0_value() {
        assert!((g0().value - 9.80665).abs() < 1e-12);
    }
}
