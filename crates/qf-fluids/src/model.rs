//! Equation-of-state trait, property packs and validation helpers.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use std::str::FromStr;

/// Lowest temperature any mixture evaluator accepts [K].
pub const T_MIN: f64 = 100.0;

/// Highest temperature any mixture evaluator accepts [K].
pub const T_MAX: f64 = 6000.0;

/// Equation of state used by a mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EosKind {
    /// Thermally perfect gas, closed form in `p`.
    #[default]
    IdealGas,
    /// Multiparameter Helmholtz correlation of a single pure fluid.
    Helmholtz,
    /// Soave–Redlich–Kwong cubic for mixtures.
    Srk,
}

impl EosKind {
    pub fn is_ideal(&self) -> bool {
        matches!(self, EosKind::IdealGas)
    }
}

impl FromStr for EosKind {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ideal" | "ideal-gas" | "ideal_gas" | "idealgas" => Ok(EosKind::IdealGas),
            "helmholtz" | "coolprop" => Ok(EosKind::Helmholtz),
            "srk" | "soave" => Ok(EosKind::Srk),
            _ => Err(FluidError::NotSupported {
                what: "unknown equation of state",
            }),
        }
    }
}

/// Caloric and thermal properties of a mixture at one `(T, p)`.
///
/// All quantities are SI, per unit mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caloric {
    /// Temperature [K]
    pub t: f64,
    /// Pressure [Pa]
    pub p: f64,
    /// Specific volume [m³/kg]
    pub v: f64,
    /// Specific enthalpy [J/kg]
    pub h: f64,
    /// Specific entropy [J/(kg·K)]
    pub s: f64,
    /// Isobaric heat capacity [J/(kg·K)]
    pub cp: f64,
    /// Isochoric heat capacity [J/(kg·K)]
    pub cv: f64,
    /// `dcp/dT` at constant pressure [J/(kg·K²)]
    pub dcp_dt: f64,
    /// Speed of sound [m/s]
    pub c: f64,
    /// Isobaric expansion `(1/v)(∂v/∂T)_p` [1/K]
    pub alpha: f64,
    /// Isothermal compressibility `-(1/v)(∂v/∂p)_T` [1/Pa]
    pub kappa: f64,
    /// Specific gas constant [J/(kg·K)]
    pub r: f64,
    /// Molar mass [kg/kmol]
    pub m: f64,
}

impl Caloric {
    pub fn rho(&self) -> f64 {
        1.0 / self.v
    }

    pub fn gamma(&self) -> f64 {
        self.cp / self.cv
    }

    /// Isochoric pressure coefficient `(1/p)(∂p/∂T)_v = α/(pκ)` [1/K].
    pub fn beta(&self) -> f64 {
        self.alpha / (self.p * self.kappa)
    }

    /// Compressibility factor `pv/(RT)`.
    pub fn z(&self) -> f64 {
        self.p * self.v / (self.r * self.t)
    }

    pub fn summary(&self) -> String {
        format!(
            "Caloric(T={:.2}K,p={:.0}Pa,ρ={:.4}kg/m³,h={:.1}J/kg,cp={:.1}J/kg·K,γ={:.4},c={:.1}m/s)",
            self.t,
            self.p,
            self.rho(),
            self.h,
            self.cp,
            self.gamma(),
            self.c
        )
    }
}

/// Molecular transport properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transport {
    /// Dynamic viscosity [Pa·s]
    pub mu: f64,
    /// Thermal conductivity [W/(m·K)]
    pub lambda: f64,
}

impl Transport {
    pub fn prandtl(&self, cp: f64) -> f64 {
        self.mu * cp / self.lambda
    }
}

/// Caloric and transport properties evaluated together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Properties {
    pub caloric: Caloric,
    pub transport: Transport,
}

impl Properties {
    pub fn prandtl(&self) -> f64 {
        self.transport.prandtl(self.caloric.cp)
    }
}

/// Trait for equation-of-state backends.
///
/// Implementations must be thread-safe (Send + Sync) so independent solver
/// instances can run on separate threads.
pub trait EquationOfState: Send + Sync {
    /// Backend name (for debugging/logging).
    fn name(&self) -> &str;

    /// Check if this backend can evaluate the given composition.
    fn supports_composition(&self, comp: &Composition) -> bool;

    /// Full caloric property pack at `(T, p)`.
    fn caloric(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Caloric>;

    /// Pressure from specific volume and temperature.
    fn pressure(&self, comp: &Composition, v: f64, t: f64) -> FluidResult<f64>;

    /// Specific volume at `(T, p)`.
    fn volume(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<f64> {
        Ok(self.caloric(comp, t, p)?.v)
    }
}

/// Validation helpers for fluid properties.
pub(crate) mod validation {
    use super::*;

    pub fn validate_pressure(p: f64) -> FluidResult<()> {
        if !p.is_finite() || p <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    /// Positive, finite and inside `[T_MIN, T_MAX]`.
    pub fn validate_temperature(t: f64) -> FluidResult<()> {
        if !t.is_finite() || t <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        if !(T_MIN..=T_MAX).contains(&t) {
            return Err(FluidError::OutOfRange {
                what: "temperature",
                value: t,
                min: T_MIN,
                max: T_MAX,
            });
        }
        Ok(())
    }

    pub fn validate_volume(v: f64) -> FluidResult<()> {
        if !v.is_finite() || v <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "specific volume must be positive and finite",
            });
        }
        Ok(())
    }

    /// Check the derived quantities a backend hands back.
    pub fn validate_caloric(c: &Caloric) -> FluidResult<()> {
        validate_volume(c.v)?;
        if !c.h.is_finite() || !c.s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy and entropy must be finite",
            });
        }
        if !c.cp.is_finite() || c.cp <= 0.0 || !c.cv.is_finite() || c.cv <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "heat capacities must be positive and finite",
            });
        }
        if !c.c.is_finite() || c.c <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "speed of sound must be positive and finite",
            });
        }
        if !c.kappa.is_finite() || c.kappa <= 0.0 || !c.alpha.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "compressibility must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_transport(tr: &Transport) -> FluidResult<()> {
        if !tr.mu.is_finite() || tr.mu <= 0.0 || !tr.lambda.is_finite() || tr.lambda <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "transport properties must be positive and finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eos_kind_parses() {
        assert_eq!("Ideal-Gas".parse::<EosKind>().unwrap(), EosKind::IdealGas);
        assert_eq!("SRK".parse::<EosKind>().unwrap(), EosKind::Srk);
        assert_eq!(" helmholtz ".parse::<EosKind>().unwrap(), EosKind::Helmholtz);
        assert!("pr".parse::<EosKind>().is_err());
    }

    #[test]
    fn temperature_range_is_enforced() {
        assert!(validation::validate_temperature(300.0).is_ok());
        assert!(matches!(
            validation::validate_temperature(50.0),
            Err(FluidError::OutOfRange { .. })
        ));
        assert!(matches!(
            validation::validate_temperature(f64::NAN),
            Err(FluidError::NonPhysical { .. })
        ));
    }

    #[test]
    fn derived_quantities() {
        let c = Caloric {
            t: 300.0,
            p: 1e5,
            v: 287.0 * 300.0 / 1e5,
            h: 0.0,
            s: 0.0,
            cp: 1004.5,
            cv: 717.5,
            dcp_dt: 0.0,
            c: 347.0,
            alpha: 1.0 / 300.0,
            kappa: 1e-5,
            r: 287.0,
            m: 28.97,
        };
        assert!((c.beta() - 1.0 / 300.0).abs() < 1e-15);
        assert!((c.z() - 1.0).abs() < 1e-12);
        assert!((c.gamma() - 1.4).abs() < 1e-3);
        assert!(c.summary().contains("T=300.00K"));
    }
}
