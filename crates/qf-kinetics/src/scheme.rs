//! Implicit reaction step along a channel.
//!
//! One step advances `Y⃗ = (Y₁ … Y_n, T)` of the reactive species over the
//! residence time `Δt = a Δx / ū` at constant pressure without heat exchange:
//!
//! ```text
//! (I − Δt J) ΔY⃗ = Δt dY⃗/dt + (1 − a) ΔY⃗_prev
//! ```
//!
//! `J` is the analytic Jacobian of the source terms, built from the rate
//! constant and mass-action partials of every active reaction.

use crate::error::{KineticsError, KineticsResult};
use crate::mechanism::Mechanism;
use nalgebra::{DMatrix, DVector};
use qf_core::constants::R_UNIVERSAL;
use qf_fluids::{Mixture, Species};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemeConfig {
    /// `a` of the first step
    pub first_step_factor: f64,
    /// `a` of every later step
    pub step_factor: f64,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            first_step_factor: 1.0,
            step_factor: 2.0 / 3.0,
        }
    }
}

/// State after one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub t: f64,
    /// Residence time of the step [s]
    pub dt: f64,
    /// Mass fractions in mixture order
    pub mass_fractions: Vec<f64>,
}

/// Density, heat capacity and concentrations shared by the source terms
/// and their Jacobian.
struct GasState {
    rho: f64,
    /// `Σ Y_k / M_k`
    inv_m: f64,
    /// Mass-specific `c_p`
    cp: f64,
    /// Concentrations in mechanism order [kmol/m³], then the lumped
    /// concentration of the bystanders
    c: Vec<f64>,
    g_rt: Vec<f64>,
    h_rt: Vec<f64>,
}

/// Source terms of the full mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct Sources {
    /// `dY_k/dt` in mixture order [1/s]
    pub dy_dt: Vec<f64>,
    /// `dT/dt` [K/s]
    pub dt_dt: f64,
}

#[derive(Debug, Clone)]
pub struct ReactionScheme {
    mechanism: Mechanism,
    /// Mechanism species index to mixture index
    map: Vec<usize>,
    /// Species of the bound mixture
    species: Vec<Species>,
    /// Mixture indices of species changed by at least one reaction
    reactive: Vec<usize>,
    /// Mixture indices of species outside the mechanism; they collide as `M`
    bystanders: Vec<usize>,
    config: SchemeConfig,
    previous: Option<DVector<f64>>,
    steps: usize,
}

impl ReactionScheme {
    /// Binds `mechanism` to the species of `mix`; every mechanism species
    /// must be present.
    pub fn new(mechanism: Mechanism, mix: &Mixture, config: SchemeConfig) -> KineticsResult<Self> {
        let species = mix.species().to_vec();
        let map = mechanism
            .species()
            .iter()
            .map(|sp| {
                species
                    .iter()
                    .position(|s| s == sp)
                    .ok_or(KineticsError::MissingSpecies { species: sp.key() })
            })
            .collect::<KineticsResult<Vec<usize>>>()?;
        let mut reactive: Vec<usize> = (0..mechanism.species().len())
            .filter(|&k| mechanism.active().any(|r| r.net_coefficient(k) != 0.0))
            .map(|k| map[k])
            .collect();
        reactive.sort_unstable();
        let bystanders = (0..species.len()).filter(|i| !map.contains(i)).collect();
        Ok(Self {
            mechanism,
            map,
            species,
            reactive,
            bystanders,
            config,
            previous: None,
            steps: 0,
        })
    }

    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }

    /// Mixture indices of the reactive species, in state-vector order.
    pub fn reactive(&self) -> &[usize] {
        &self.reactive
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Forget the previous step; the next step is a first step again.
    pub fn reset(&mut self) {
        self.previous = None;
        self.steps = 0;
    }

    fn state(&self, t: f64, p: f64, y: &[f64]) -> KineticsResult<GasState> {
        if y.len() != self.species.len() {
            return Err(KineticsError::InvalidArg {
                what: "mass fraction count differs from species count",
            });
        }
        if !(t > 0.0 && p > 0.0) {
            return Err(KineticsError::NonPhysical {
                what: "reaction temperature or pressure",
            });
        }
        let inv_m: f64 = y.iter().zip(&self.species).map(|(yk, s)| yk / s.molar_mass()).sum();
        let rho = p / (R_UNIVERSAL * inv_m * t);
        let cp: f64 = y
            .iter()
            .zip(&self.species)
            .map(|(yk, s)| yk * s.nasa7().cp_r(t) * R_UNIVERSAL / s.molar_mass())
            .sum();
        let mech_species = self.mechanism.species();
        let mut c: Vec<f64> = self
            .map
            .iter()
            .zip(mech_species)
            .map(|(&i, s)| rho * y[i].max(0.0) / s.molar_mass())
            .collect();
        c.push(
            self.bystanders
                .iter()
                .map(|&i| rho * y[i].max(0.0) / self.species[i].molar_mass())
                .sum(),
        );
        Ok(GasState {
            rho,
            inv_m,
            cp,
            c,
            g_rt: mech_species.iter().map(|s| s.nasa7().g_rt(t)).collect(),
            h_rt: mech_species.iter().map(|s| s.nasa7().h_rt(t)).collect(),
        })
    }

    /// Ideal-gas source terms at `(T, p)` for mass fractions `y` in mixture
    /// order.
    pub fn sources(&self, t: f64, p: f64, y: &[f64]) -> KineticsResult<Sources> {
        let g = self.state(t, p, y)?;
        let mech_species = self.mechanism.species();

        // molar production rates in mechanism order [kmol/(m³ s)]
        let mut omega = vec![0.0; mech_species.len()];
        for r in self.mechanism.active() {
            let q = r.progress(t, &g.c, &g.g_rt);
            for (k, nu) in &r.reactants {
                omega[*k] -= nu * q;
            }
            for (k, nu) in &r.products {
                omega[*k] += nu * q;
            }
        }

        let mut dy_dt = vec![0.0; y.len()];
        let mut heat = 0.0;
        for ((k, s), w) in mech_species.iter().enumerate().zip(&omega) {
            dy_dt[self.map[k]] += s.molar_mass() * w / g.rho;
            heat += g.h_rt[k] * R_UNIVERSAL * t * w;
        }
        Ok(Sources {
            dy_dt,
            dt_dt: -heat / (g.rho * g.cp),
        })
    }

    /// Jacobian of `(dY₁/dt … dY_n/dt, dT/dt)` with respect to
    /// `(Y₁ … Y_n, T)`, mixture order with temperature last.
    pub fn jacobian(&self, t: f64, p: f64, y: &[f64]) -> KineticsResult<DMatrix<f64>> {
        let g = self.state(t, p, y)?;
        let mech_species = self.mechanism.species();
        let (nm, ns) = (mech_species.len(), y.len());
        let inv_mass: Vec<f64> = self.species.iter().map(|s| 1.0 / s.molar_mass()).collect();

        // ∂ω/∂Y_j and dω/dT with the density and concentration chain folded in
        let mut omega = vec![0.0; nm];
        let mut domega_dy = DMatrix::<f64>::zeros(nm, ns);
        let mut domega_dt = vec![0.0; nm];
        for r in self.mechanism.active() {
            let pr = r.progress_partials(t, &g.c, &g.g_rt, &g.h_rt);
            let pull: f64 = pr.dq_dc.iter().zip(&g.c).map(|(d, c)| d * c).sum();
            let mut dq_dy: Vec<f64> = inv_mass.iter().map(|im| -pull * im / g.inv_m).collect();
            for (m, d) in pr.dq_dc.iter().enumerate().take(nm) {
                dq_dy[self.map[m]] += g.rho / mech_species[m].molar_mass() * d;
            }
            for &i in &self.bystanders {
                dq_dy[i] += g.rho * inv_mass[i] * pr.dq_dc[nm];
            }
            let dq_dt = pr.dq_dt - pull / t;
            for k in 0..nm {
                let nu = r.net_coefficient(k);
                if nu == 0.0 {
                    continue;
                }
                omega[k] += nu * pr.q;
                domega_dt[k] += nu * dq_dt;
                for (j, d) in dq_dy.iter().enumerate() {
                    domega_dy[(k, j)] += nu * d;
                }
            }
        }

        let rcp = g.rho * g.cp;
        let mut jac = DMatrix::<f64>::zeros(ns + 1, ns + 1);
        let mut heat = 0.0;
        let mut dheat_dy = vec![0.0; ns];
        let mut dheat_dt = 0.0;
        for (k, s) in mech_species.iter().enumerate() {
            let i = self.map[k];
            let scale = s.molar_mass() / g.rho;
            for j in 0..ns {
                jac[(i, j)] += scale * (domega_dy[(k, j)] + omega[k] * inv_mass[j] / g.inv_m);
            }
            jac[(i, ns)] += scale * (domega_dt[k] + omega[k] / t);

            let h = g.h_rt[k] * R_UNIVERSAL * t;
            heat += h * omega[k];
            for (j, d) in dheat_dy.iter_mut().enumerate() {
                *d += h * domega_dy[(k, j)];
            }
            dheat_dt += s.nasa7().cp_r(t) * R_UNIVERSAL * omega[k] + h * domega_dt[k];
        }
        for j in 0..ns {
            let cp_j = self.species[j].nasa7().cp_r(t) * R_UNIVERSAL * inv_mass[j];
            let drcp = -g.rho * inv_mass[j] / g.inv_m * g.cp + g.rho * cp_j;
            jac[(ns, j)] = -dheat_dy[j] / rcp + heat * drcp / (rcp * rcp);
        }
        let dcp_dt: f64 = y
            .iter()
            .zip(&self.species)
            .zip(&inv_mass)
            .map(|((yk, s), im)| yk * s.nasa7().dcp_r_dt(t) * R_UNIVERSAL * im)
            .sum();
        let drcp_dt = -rcp / t + g.rho * dcp_dt;
        jac[(ns, ns)] = -dheat_dt / rcp + heat * drcp_dt / (rcp * rcp);
        Ok(jac)
    }

    /// Advance the mixture by `dx` at bulk velocity `u`; the new composition
    /// is written into `mix` and the new temperature returned.
    pub fn step(&mut self, mix: &mut Mixture, t: f64, p: f64, u: f64, dx: f64) -> KineticsResult<StepOutcome> {
        if !(u > 0.0 && dx > 0.0) {
            return Err(KineticsError::InvalidArg {
                what: "reaction step needs positive velocity and length",
            });
        }
        let a = if self.previous.is_none() {
            self.config.first_step_factor
        } else {
            self.config.step_factor
        };
        let dt = a * dx / u;
        let base = mix.mass_fractions().to_vec();
        let n = self.reactive.len();

        let full = self.sources(t, p, &base)?;
        let mut f0 = DVector::<f64>::zeros(n + 1);
        for (j, &i) in self.reactive.iter().enumerate() {
            f0[j] = full.dy_dt[i];
        }
        f0[n] = full.dt_dt;

        let full_jac = self.jacobian(t, p, &base)?;
        let ns = base.len();
        let pick = |j: usize| if j == n { ns } else { self.reactive[j] };
        let jac = DMatrix::<f64>::from_fn(n + 1, n + 1, |r, c| full_jac[(pick(r), pick(c))]);

        let lhs = DMatrix::identity(n + 1, n + 1) - jac * dt;
        let mut rhs = f0 * dt;
        if let Some(prev) = &self.previous {
            rhs += prev * (1.0 - a);
        }
        let mut dz = lhs.lu().solve(&rhs).ok_or(KineticsError::NonPhysical {
            what: "singular implicit reaction matrix",
        })?;

        let mut y = base;
        for (j, &i) in self.reactive.iter().enumerate() {
            dz[j] = dz[j].max(-y[i]);
            y[i] += dz[j];
        }
        let t_new = t + dz[n];
        if !(t_new > 0.0 && t_new.is_finite()) {
            return Err(KineticsError::NonPhysical {
                what: "temperature after reaction step",
            });
        }
        mix.remix(&y)?;
        self.previous = Some(dz);
        self.steps += 1;
        debug!(step = self.steps, dt, t = t_new, "reaction step");
        Ok(StepOutcome {
            t: t_new,
            dt,
            mass_fractions: mix.mass_fractions().to_vec(),
        })
    }
}
