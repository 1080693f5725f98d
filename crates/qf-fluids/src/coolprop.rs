//! Helmholtz (CoolProp via rfluids) backend for a single pure fluid.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::ideal::{IdealGas, species_enthalpy};
use crate::model::{Caloric, EquationOfState, Transport, validation};
use crate::species::Species;
use rfluids::prelude::*;

/// Anchor state where the backend is shifted onto the NASA reference.
const ANCHOR_T: f64 = 300.0;
const ANCHOR_P: f64 = 1000.0;

/// Relative step for the finite-difference derivatives of density.
const REL_STEP: f64 = 1e-5;

/// Pure-fluid multiparameter backend.
///
/// Enthalpy and entropy are shifted so that they agree with the ideal-gas
/// tables at a dilute anchor state. This lets Helmholtz results be spliced
/// onto the SRK alternate and mixed with equilibrium chemistry.
#[derive(Debug, Clone, PartialEq)]
pub struct Helmholtz {
    species: Species,
    h_offset: f64,
    s_offset: f64,
}

fn backend_err(what: &str, t: f64, p: f64, e: impl std::fmt::Display) -> FluidError {
    FluidError::Backend {
        message: format!("rfluids error getting {what} at T={t} K, P={p} Pa: {e}"),
    }
}

impl Helmholtz {
    /// Create the backend for `species`, computing the reference offsets.
    pub fn new(species: Species) -> FluidResult<Self> {
        if species.rfluids_pure().is_none() {
            return Err(FluidError::InvalidMixture {
                what: "species has no Helmholtz correlation",
            });
        }
        let mut model = Self {
            species,
            h_offset: 0.0,
            s_offset: 0.0,
        };
        let comp = Composition::pure(species);
        let ideal = IdealGas.caloric(&comp, ANCHOR_T, ANCHOR_P)?;
        let mut fluid = model.fluid_at_pt(ANCHOR_T, ANCHOR_P)?;
        let h = fluid
            .enthalpy()
            .map_err(|e| backend_err("enthalpy", ANCHOR_T, ANCHOR_P, e))?;
        let s = fluid
            .entropy()
            .map_err(|e| backend_err("entropy", ANCHOR_T, ANCHOR_P, e))?;
        model.h_offset = species_enthalpy(species, ANCHOR_T) - h;
        model.s_offset = ideal.s - s;
        Ok(model)
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// Upper validity temperature of the correlation [K].
    pub fn t_max(&self) -> f64 {
        self.species.helmholtz_t_max().unwrap_or(crate::model::T_MIN)
    }

    fn pure(&self) -> FluidResult<Pure> {
        self.species.rfluids_pure().ok_or(FluidError::InvalidMixture {
            what: "species has no Helmholtz correlation",
        })
    }

    fn fluid_at_pt(&self, t: f64, p: f64) -> FluidResult<Fluid> {
        Fluid::from(self.pure()?)
            .in_state(FluidInput::pressure(p), FluidInput::temperature(t))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at P={p} Pa, T={t} K: {e}"),
            })
    }

    fn density(&self, t: f64, p: f64) -> FluidResult<f64> {
        self.fluid_at_pt(t, p)?
            .density()
            .map_err(|e| backend_err("density", t, p, e))
    }

    /// Molecular transport from the backend.
    pub fn transport(&self, t: f64, p: f64) -> FluidResult<Transport> {
        let mut fluid = self.fluid_at_pt(t, p)?;
        let tr = Transport {
            mu: fluid
                .dynamic_viscosity()
                .map_err(|e| backend_err("viscosity", t, p, e))?,
            lambda: fluid
                .conductivity()
                .map_err(|e| backend_err("conductivity", t, p, e))?,
        };
        validation::validate_transport(&tr)?;
        Ok(tr)
    }

    fn check(&self, comp: &Composition) -> FluidResult<()> {
        if self.supports_composition(comp) {
            Ok(())
        } else {
            Err(FluidError::InvalidMixture {
                what: "Helmholtz backend needs its own single component",
            })
        }
    }
}

impl EquationOfState for Helmholtz {
    fn name(&self) -> &str {
        "helmholtz"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        comp.is_pure() == Some(self.species)
    }

    fn caloric(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Caloric> {
        self.check(comp)?;
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;

        let mut fluid = self.fluid_at_pt(t, p)?;
        let rho = fluid
            .density()
            .map_err(|e| backend_err("density", t, p, e))?;
        let h = fluid
            .enthalpy()
            .map_err(|e| backend_err("enthalpy", t, p, e))?;
        let s = fluid
            .entropy()
            .map_err(|e| backend_err("entropy", t, p, e))?;
        let cp = fluid
            .specific_heat()
            .map_err(|e| backend_err("cp", t, p, e))?;
        let cv = fluid
            .specific_heat_const_volume()
            .map_err(|e| backend_err("cv", t, p, e))?;
        let c = fluid
            .sound_speed()
            .map_err(|e| backend_err("sound speed", t, p, e))?;

        let dt = REL_STEP * t;
        let dp = REL_STEP * p;
        let alpha = -(self.density(t + dt, p)? - self.density(t - dt, p)?) / (2.0 * dt * rho);
        let kappa = (self.density(t, p + dp)? - self.density(t, p - dp)?) / (2.0 * dp * rho);
        let cp_hi = self
            .fluid_at_pt(t + dt, p)?
            .specific_heat()
            .map_err(|e| backend_err("cp", t + dt, p, e))?;
        let cp_lo = self
            .fluid_at_pt(t - dt, p)?
            .specific_heat()
            .map_err(|e| backend_err("cp", t - dt, p, e))?;

        let caloric = Caloric {
            t,
            p,
            v: 1.0 / rho,
            h: h + self.h_offset,
            s: s + self.s_offset,
            cp,
            cv,
            dcp_dt: (cp_hi - cp_lo) / (2.0 * dt),
            c,
            alpha,
            kappa,
            r: comp.gas_constant(),
            m: comp.molar_mass(),
        };
        validation::validate_caloric(&caloric)?;
        Ok(caloric)
    }

    fn pressure(&self, comp: &Composition, v: f64, t: f64) -> FluidResult<f64> {
        self.check(comp)?;
        validation::validate_volume(v)?;
        let mut fluid = Fluid::from(self.pure()?)
            .in_state(FluidInput::density(1.0 / v), FluidInput::temperature(t))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at rho={} kg/m³, T={t} K: {e}", 1.0 / v),
            })?;
        fluid.pressure().map_err(|e| FluidError::Backend {
            message: format!("rfluids error getting pressure: {e}"),
        })
    }

    fn volume(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<f64> {
        self.check(comp)?;
        Ok(1.0 / self.density(t, p)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radicals_are_rejected() {
        assert!(matches!(
            Helmholtz::new(Species::OH),
            Err(FluidError::InvalidMixture { .. })
        ));
    }
}
