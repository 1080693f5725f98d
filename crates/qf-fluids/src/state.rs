//! Bulk flow state: mutually derived scalars of a stream cross-section.

use crate::error::{FluidError, FluidResult};
use crate::mixture::Mixture;
use crate::model::{T_MAX, T_MIN};
use qf_core::units::{Density, MassRate, Pressure, Temperature, Velocity, k, kg_m3, kgps, mps, pa};
use tracing::debug;

/// Iteration cap for the equilibrium temperature search.
const EQUILIBRIUM_MAX_ITERATIONS: usize = 100;

/// Stream state at one cross-section.
///
/// `caloric` derives every field from `(T, p, u)` and the current mixture;
/// `equilibrium` first solves for the temperature whose equilibrium
/// composition carries a target enthalpy. Geometry fields stay zero until
/// `with_geometry` is called.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub t: f64,
    pub p: f64,
    pub u: f64,
    pub rho: f64,
    /// Molar mass [kg/kmol]
    pub m: f64,
    /// Specific gas constant [J/(kg·K)]
    pub r: f64,
    pub h: f64,
    pub cp: f64,
    pub s: f64,
    pub gamma: f64,
    /// Speed of sound [m/s]
    pub c: f64,
    pub ma: f64,
    pub t_t: f64,
    pub p_t: f64,
    pub h_t: f64,
    pub mu: f64,
    pub lambda: f64,
    pub pr: f64,
    /// Reynolds number on the hydraulic diameter
    pub re: f64,
    pub area: f64,
    pub d_h: f64,
    pub x: f64,
}

impl FlowState {
    /// Derive the state from `(t, p, u)` at the mixture's current composition.
    pub fn caloric(mix: &Mixture, t: f64, p: f64, u: f64) -> FluidResult<Self> {
        let props = mix.properties(t, p)?;
        let c = props.caloric;
        let (t_t, p_t) = mix.total(t, p, u)?;
        Ok(Self {
            t,
            p,
            u,
            rho: c.rho(),
            m: c.m,
            r: c.r,
            h: c.h,
            cp: c.cp,
            s: c.s,
            gamma: c.gamma(),
            c: c.c,
            ma: u / c.c,
            t_t,
            p_t,
            h_t: c.h + 0.5 * u * u,
            mu: props.transport.mu,
            lambda: props.transport.lambda,
            pr: props.prandtl(),
            re: 0.0,
            area: 0.0,
            d_h: 0.0,
            x: 0.0,
        })
    }

    /// Same as [`FlowState::caloric`] with unit-checked inputs.
    pub fn from_units(mix: &Mixture, t: Temperature, p: Pressure, u: Velocity) -> FluidResult<Self> {
        Self::caloric(mix, t.value, p.value, u.value)
    }

    /// Solve for the temperature at which the equilibrium mixture has static
    /// enthalpy `h`, leave `mix` remixed to that equilibrium and derive the state.
    pub fn equilibrium(
        mix: &mut Mixture,
        h: f64,
        p: f64,
        u: f64,
        t_guess: f64,
    ) -> FluidResult<Self> {
        let mut t = t_guess.clamp(T_MIN, T_MAX);
        let (mut lo, mut hi) = (T_MIN, T_MAX);
        let dt = 0.5;
        for iter in 0..EQUILIBRIUM_MAX_ITERATIONS {
            mix.remix_to_equilibrium(t, p)?;
            let residual = mix.enthalpy(t, p)? - h;
            if residual > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            let t_probe = if t + dt <= T_MAX { t + dt } else { t - dt };
            let mut probe = mix.clone();
            probe.remix_to_equilibrium(t_probe, p)?;
            let slope = (probe.enthalpy(t_probe, p)? - h - residual) / (t_probe - t);
            let mut next = if slope > 0.0 { t - residual / slope } else { t };
            if !(next > lo && next < hi) {
                next = 0.5 * (lo + hi);
            }
            if (next - t).abs() <= 1e-9 * t {
                debug!(iterations = iter + 1, t = next, "equilibrium temperature found");
                mix.remix_to_equilibrium(next, p)?;
                return Self::caloric(mix, next, p, u);
            }
            t = next;
        }
        Err(FluidError::TooManyIterations {
            what: "equilibrium temperature",
            iterations: EQUILIBRIUM_MAX_ITERATIONS,
            state: format!("h={h} J/kg, p={p} Pa, T={t} K"),
        })
    }

    /// Attach cross-section geometry and derive the Reynolds number.
    pub fn with_geometry(mut self, area: f64, d_h: f64, x: f64) -> Self {
        self.area = area;
        self.d_h = d_h;
        self.x = x;
        self.re = self.rho * self.u.abs() * d_h / self.mu;
        self
    }

    /// Mass flow through the attached area [kg/s].
    pub fn mass_flow(&self) -> f64 {
        self.rho * self.u * self.area
    }

    pub fn temperature(&self) -> Temperature {
        k(self.t)
    }

    pub fn pressure(&self) -> Pressure {
        pa(self.p)
    }

    pub fn velocity(&self) -> Velocity {
        mps(self.u)
    }

    pub fn density(&self) -> Density {
        kg_m3(self.rho)
    }

    pub fn mass_rate(&self) -> MassRate {
        kgps(self.mass_flow())
    }
}
