//! Thermally perfect gas built on the NASA polynomials.

use crate::composition::Composition;
use crate::error::FluidResult;
use crate::model::{Caloric, EquationOfState, validation};
use crate::species::Species;
use qf_core::constants::{P_REF, R_UNIVERSAL};

/// Ideal-gas backend. Stateless.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdealGas;

/// Ideal-gas contributions shared with the cubic equation of state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IdealParts {
    pub h: f64,
    pub s: f64,
    pub cp: f64,
    pub dcp_dt: f64,
}

/// Specific enthalpy of a pure species [J/kg].
pub fn species_enthalpy(species: Species, t: f64) -> f64 {
    species.nasa7().h_rt(t) * R_UNIVERSAL * t / species.molar_mass()
}

/// Standard-state specific entropy of a pure species [J/(kg·K)].
pub fn species_entropy(species: Species, t: f64) -> f64 {
    species.nasa7().s_r(t) * R_UNIVERSAL / species.molar_mass()
}

/// Specific heat of a pure species [J/(kg·K)].
pub fn species_cp(species: Species, t: f64) -> f64 {
    species.nasa7().cp_r(t) * R_UNIVERSAL / species.molar_mass()
}

pub(crate) fn ideal_parts(comp: &Composition, t: f64, p: f64) -> IdealParts {
    let mut parts = IdealParts {
        h: 0.0,
        s: 0.0,
        cp: 0.0,
        dcp_dt: 0.0,
    };
    for ((sp, yk), xk) in comp
        .species()
        .iter()
        .zip(comp.mass_fractions())
        .zip(comp.mole_fractions())
    {
        if *yk <= 0.0 {
            continue;
        }
        let nasa = sp.nasa7();
        let rk = R_UNIVERSAL / sp.molar_mass();
        parts.h += yk * nasa.h_rt(t) * rk * t;
        parts.s += yk * rk * (nasa.s_r(t) - (xk * p / P_REF).ln());
        parts.cp += yk * rk * nasa.cp_r(t);
        parts.dcp_dt += yk * rk * nasa.dcp_r_dt(t);
    }
    parts
}

impl EquationOfState for IdealGas {
    fn name(&self) -> &str {
        "ideal-gas"
    }

    fn supports_composition(&self, _comp: &Composition) -> bool {
        true
    }

    fn caloric(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Caloric> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        let r = comp.gas_constant();
        let parts = ideal_parts(comp, t, p);
        let cv = parts.cp - r;
        let caloric = Caloric {
            t,
            p,
            v: r * t / p,
            h: parts.h,
            s: parts.s,
            cp: parts.cp,
            cv,
            dcp_dt: parts.dcp_dt,
            c: (parts.cp / cv * r * t).sqrt(),
            alpha: 1.0 / t,
            kappa: 1.0 / p,
            r,
            m: comp.molar_mass(),
        };
        validation::validate_caloric(&caloric)?;
        Ok(caloric)
    }

    fn pressure(&self, comp: &Composition, v: f64, t: f64) -> FluidResult<f64> {
        validation::validate_volume(v)?;
        Ok(comp.gas_constant() * t / v)
    }

    fn volume(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<f64> {
        validation::validate_pressure(p)?;
        Ok(comp.gas_constant() * t / p)
    }
}
