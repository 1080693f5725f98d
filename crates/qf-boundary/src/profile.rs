//! Profile reconstruction for one centre state `(T̂, û)`.
//!
//! Sequence per trial: wall state → Crocco–Busemann transform → shear
//! stress (Newton on `1/u_τ`) → velocity profile → temperature profile →
//! turbulence closure → σ/r → balance integrals.

use crate::crocco::CroccoBusemann;
use crate::error::{BoundaryError, BoundaryResult};
use crate::grid::Grid;
use crate::methods::SigmaMode;
use crate::quadrature::{derivative, integrate};
use crate::sigma::{ProfileSlice, SigmaRecovery, petukhov, van_driest};
use qf_core::constants::{B_PLUS_SMOOTH, KARMAN, ROUGHNESS_C_R};
use qf_fluids::{FlowState, PropertySplines};
use qf_wall::{dg_plus, g_plus, kays_crawford_default, spalding, spalding_dydf, spalding_e};
use tracing::warn;

/// Newton damping of the shear-stress solve.
const SHEAR_OMEGA: f64 = 0.9;
const SHEAR_TOL: f64 = 1e-12;
const SHEAR_MAX_ITERATIONS: usize = 100;

/// Fixed-point caps on `σ`.
const PETUKHOV_MAX_ITERATIONS: usize = 50;
const VAN_DRIEST_MAX_ITERATIONS: usize = 20;
const SIGMA_TOL: f64 = 1e-12;

/// Wall state evaluated from the property splines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallProps {
    pub t: f64,
    pub rho: f64,
    pub h: f64,
    pub cp: f64,
    pub mu: f64,
    pub lambda: f64,
    /// Isobaric expansion `(1/v) dv/dT`
    pub alpha: f64,
}

impl WallProps {
    pub fn from_splines(s: &PropertySplines, t: f64) -> BoundaryResult<Self> {
        Ok(Self {
            t,
            rho: s.rho(t)?,
            h: s.h(t)?,
            cp: s.cp(t)?,
            mu: s.mu(t)?,
            lambda: s.lambda(t)?,
            alpha: s.alpha(t)?,
        })
    }

    pub fn prandtl(&self) -> f64 {
        self.mu * self.cp / self.lambda
    }
}

/// Reconstructed half-channel profile. Node 0 is the wall.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub y: Vec<f64>,
    pub y_plus: Vec<f64>,
    pub u_plus: Vec<f64>,
    pub u: Vec<f64>,
    pub du_dy: Vec<f64>,
    pub t: Vec<f64>,
    pub rho: Vec<f64>,
    pub h: Vec<f64>,
    pub cp: Vec<f64>,
    pub mu: Vec<f64>,
    pub lambda: Vec<f64>,
    pub mu_t: Vec<f64>,
    pub lambda_t: Vec<f64>,
    pub tau: Vec<f64>,
    pub dtau_dy: Vec<f64>,
    /// `(μ+μ_T)c_p/(λ+λ_T)`
    pub pr_eff: Vec<f64>,
    pub t_center: f64,
    pub u_center: f64,
    pub h_center: f64,
    pub tau_wall: f64,
    pub u_tau: f64,
    pub sigma_recovery: SigmaRecovery,
    pub err_mass: f64,
    pub err_momentum: f64,
    pub err_energy: f64,
}

impl Profile {
    /// `Y⁺` of the first node off the wall.
    pub fn y_plus_1(&self) -> f64 {
        self.y_plus.get(1).copied().unwrap_or(0.0)
    }

    /// Recovery enthalpy `ĥ + r û²/2`.
    pub fn h_recovery(&self) -> f64 {
        self.h_center + 0.5 * self.sigma_recovery.r * self.u_center * self.u_center
    }

    /// Wall heat flux `τ_w (h_r − h_w)/(σ û)`, positive into the wall.
    pub fn q_wall(&self, h_wall: f64) -> f64 {
        self.tau_wall * (self.h_recovery() - h_wall) / (self.sigma_recovery.sigma * self.u_center)
    }
}

/// Everything the reconstruction reads besides the trial centre state.
pub(crate) struct ProfileContext<'a> {
    pub grid: &'a Grid,
    pub splines: &'a PropertySplines,
    pub bulk: &'a FlowState,
    pub wall: WallProps,
    pub d_h: f64,
    /// Specific gas constant of an ideal-gas mixture
    pub ideal_r: Option<f64>,
    pub roughness: f64,
    pub wake_pi: f64,
    pub sigma_mode: SigmaMode,
}

impl ProfileContext<'_> {
    fn correlation_fail(&self, t_hat: f64, u_hat: f64) -> BoundaryError {
        BoundaryError::CorrelationFail {
            d_h: self.d_h,
            t_center: t_hat,
            p: self.splines.pressure(),
            u_center: u_hat,
            t_wall: self.wall.t,
        }
    }

    fn transform(
        &self,
        sr: &SigmaRecovery,
        h_hat: f64,
        rho_hat: f64,
        t_hat: f64,
        u_hat: f64,
    ) -> BoundaryResult<CroccoBusemann> {
        let w = &self.wall;
        let psi = w.mu / (sr.sigma * w.lambda) * (h_hat + 0.5 * sr.r * u_hat * u_hat - w.h) * w.alpha;
        CroccoBusemann::new(psi, w.rho / rho_hat).ok_or_else(|| self.correlation_fail(t_hat, u_hat))
    }

    /// Log-law intercept with the roughness shift at friction velocity `u_tau`.
    fn intercept(&self, u_tau: f64) -> f64 {
        let k_plus = self.wall.rho * self.roughness * u_tau / self.wall.mu;
        B_PLUS_SMOOTH - (1.0 + k_plus / ROUGHNESS_C_R).ln() / KARMAN
    }

    /// Friction velocity from `f⁺(y⁺_c) + g⁺(1) = A û/u_τ`, solved on
    /// `x = 1/u_τ`.
    pub fn shear_velocity(&self, cb: &CroccoBusemann, u_hat: f64, u_tau_seed: f64) -> BoundaryResult<f64> {
        let w = &self.wall;
        let r_h = self.grid.half_width();
        let a_u = cb.shear_constant() * u_hat;
        let g_center = g_plus(KARMAN, self.wake_pi, 1.0);
        let mut x = 1.0 / u_tau_seed;
        let mut f_seed = None;
        for _ in 0..SHEAR_MAX_ITERATIONS {
            let b = self.intercept(1.0 / x);
            let e = spalding_e(b, KARMAN);
            let y_plus = w.rho * r_h / (w.mu * x);
            let f = spalding(b, KARMAN, e, y_plus, f_seed)?;
            f_seed = Some(f);
            let residual = f + g_center - a_u * x;
            let slope = -(y_plus / x) / spalding_dydf(b, KARMAN, e, f) - a_u;
            let dx = -residual / slope;
            let step = (SHEAR_OMEGA * x / dx.abs()).min(SHEAR_OMEGA);
            x += step * dx;
            if dx.abs() <= SHEAR_TOL * x {
                return Ok(1.0 / x);
            }
        }
        Err(BoundaryError::TooManyIterations {
            what: "shear stress",
            iterations: SHEAR_MAX_ITERATIONS,
            state: format!("u_c={u_hat} m/s, T_w={} K, 1/u_tau={x}", w.t),
        })
    }

    /// Reconstruct the profile for the trial centre state.
    pub fn reconstruct(&self, t_hat: f64, u_hat: f64) -> BoundaryResult<Profile> {
        let h_hat = self.splines.h(t_hat)?;
        let rho_hat = self.splines.rho(t_hat)?;
        let bulk = self.bulk;
        let mut sr = SigmaRecovery {
            sigma: 1.0,
            r: bulk.pr.cbrt(),
            fallback: false,
        };
        let mut u_tau = 0.05 * u_hat;

        match self.sigma_mode {
            SigmaMode::Petukhov => {
                for _ in 0..PETUKHOV_MAX_ITERATIONS {
                    let cb = self.transform(&sr, h_hat, rho_hat, t_hat, u_hat)?;
                    u_tau = self.shear_velocity(&cb, u_hat, u_tau)?;
                    let tau_wall = self.wall.rho * u_tau * u_tau;
                    let c_f = 2.0 * tau_wall / (bulk.rho * bulk.u * bulk.u);
                    let next = petukhov(bulk.pr, c_f);
                    let done = (next.sigma - sr.sigma).abs() <= SIGMA_TOL * next.sigma.abs();
                    sr = next;
                    if done {
                        return self.build(t_hat, u_hat, h_hat, rho_hat, sr, u_tau);
                    }
                }
                Err(BoundaryError::TooManyIterations {
                    what: "Petukhov sigma",
                    iterations: PETUKHOV_MAX_ITERATIONS,
                    state: format!("T_c={t_hat} K, u_c={u_hat} m/s, sigma={}", sr.sigma),
                })
            }
            SigmaMode::VanDriest => {
                let pr_wall = self.wall.prandtl();
                for _ in 0..VAN_DRIEST_MAX_ITERATIONS {
                    let profile = self.build(t_hat, u_hat, h_hat, rho_hat, sr, u_tau)?;
                    u_tau = profile.u_tau;
                    let slice = ProfileSlice {
                        y: &profile.y,
                        du_dy: &profile.du_dy,
                        tau: &profile.tau,
                        dtau_dy: &profile.dtau_dy,
                        pr: &profile.pr_eff,
                    };
                    let next = van_driest(&slice, u_hat, profile.tau_wall, pr_wall);
                    if next.fallback {
                        return self.build(t_hat, u_hat, h_hat, rho_hat, next, u_tau);
                    }
                    let done = (next.sigma - sr.sigma).abs() <= SIGMA_TOL * next.sigma.abs()
                        && (next.r - sr.r).abs() <= SIGMA_TOL * next.r.abs();
                    sr = next;
                    if done {
                        return self.build(t_hat, u_hat, h_hat, rho_hat, sr, u_tau);
                    }
                }
                warn!(
                    t_center = t_hat,
                    u_center = u_hat,
                    "van Driest sigma did not settle; using Prandtl power law"
                );
                self.build(t_hat, u_hat, h_hat, rho_hat, SigmaRecovery::fallback(pr_wall), u_tau)
            }
        }
    }

    fn build(
        &self,
        t_hat: f64,
        u_hat: f64,
        h_hat: f64,
        rho_hat: f64,
        sr: SigmaRecovery,
        u_tau_seed: f64,
    ) -> BoundaryResult<Profile> {
        let cb = self.transform(&sr, h_hat, rho_hat, t_hat, u_hat)?;
        let u_tau = self.shear_velocity(&cb, u_hat, u_tau_seed)?;
        let w = &self.wall;
        let s = self.splines;
        let grid = self.grid;
        let n = grid.len();
        let r_h = grid.half_width();
        let p = s.pressure();
        let (t_lo, t_hi) = s.t_range();
        let (rho_min, rho_max) = (s.rho(t_hi)?, s.rho(t_lo)?);

        let c_plus = w.rho * u_tau / w.mu;
        let b = self.intercept(u_tau);
        let e = spalding_e(b, KARMAN);

        let mut out = Profile {
            y: grid.y().to_vec(),
            t_center: t_hat,
            u_center: u_hat,
            h_center: h_hat,
            tau_wall: w.rho * u_tau * u_tau,
            u_tau,
            sigma_recovery: sr,
            ..Profile::default()
        };
        for col in [
            &mut out.y_plus,
            &mut out.u_plus,
            &mut out.u,
            &mut out.du_dy,
            &mut out.t,
            &mut out.rho,
            &mut out.h,
            &mut out.cp,
            &mut out.mu,
            &mut out.lambda,
            &mut out.mu_t,
            &mut out.lambda_t,
            &mut out.tau,
            &mut out.pr_eff,
        ] {
            col.resize(n, 0.0);
        }

        // velocity and temperature, marching out from the wall
        let mut f_prev = None;
        for k in 0..n {
            let eta = grid.eta(k);
            let y_plus = c_plus * grid.y()[k];
            let f = spalding(b, KARMAN, e, y_plus, f_prev)?;
            f_prev = Some(f);
            let u_plus = f + g_plus(KARMAN, self.wake_pi, eta);
            let v = cb.velocity_ratio(u_plus * u_tau / u_hat);
            let rho = (w.rho / cb.wall_density_ratio(v)).clamp(rho_min, rho_max);
            let t = match self.ideal_r {
                Some(r) => (p / (r * rho)).clamp(t_lo, t_hi),
                None => s.t_from_v(1.0 / rho)?,
            };
            let du_du_plus = u_tau * (w.rho / rho).sqrt();
            let du_plus_dy = c_plus / spalding_dydf(b, KARMAN, e, f)
                + dg_plus(KARMAN, self.wake_pi, eta) / r_h;

            out.y_plus[k] = y_plus;
            out.u_plus[k] = u_plus;
            out.u[k] = u_hat * v;
            out.du_dy[k] = du_du_plus * du_plus_dy;
            out.rho[k] = rho;
            out.t[k] = t;
            out.h[k] = s.h(t)?;
            out.cp[k] = s.cp(t)?;
            out.mu[k] = s.mu(t)?;
            out.lambda[k] = s.lambda(t)?;
        }
        out.u[0] = 0.0;

        // turbulence closure
        for k in 0..n {
            let (mu, cp, lambda) = (out.mu[k], out.cp[k], out.lambda[k]);
            let mu_t = mu * KARMAN * out.y_plus[k];
            let pr_t = kays_crawford_default(mu * cp / lambda, mu, mu_t);
            let lambda_t = mu_t * cp / pr_t;
            out.mu_t[k] = mu_t;
            out.lambda_t[k] = lambda_t;
            out.tau[k] = (mu + mu_t) * out.du_dy[k].abs();
            out.pr_eff[k] = (mu + mu_t) * cp / (lambda + lambda_t);
        }
        out.tau[0] = out.tau_wall;
        out.tau[n - 1] = 0.0;
        out.dtau_dy = derivative(&out.y, &out.tau);

        // balances against the bulk stream
        let bulk = self.bulk;
        let wt = grid.weight();
        let area = grid.area();
        let rho_u: Vec<f64> = out.rho.iter().zip(&out.u).map(|(r, u)| r * u).collect();
        let rho_uu: Vec<f64> = rho_u.iter().zip(&out.u).map(|(m, u)| m * u).collect();
        let rho_uh: Vec<f64> = rho_u.iter().zip(&out.h).map(|(m, h)| m * h).collect();
        let mass = integrate(&out.y, &rho_u, wt);
        let momentum = integrate(&out.y, &rho_uu, wt);
        let energy = integrate(&out.y, &rho_uh, wt);
        out.err_mass = mass / (bulk.rho * bulk.u * area) - 1.0;
        out.err_momentum = momentum / (bulk.rho * bulk.u * bulk.u * area) - 1.0;
        out.err_energy = (energy / mass - bulk.h) / (bulk.cp * bulk.t);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ChannelKind, DEFAULT_CELLS, DEFAULT_RATIO};
    use approx::assert_relative_eq;
    use qf_core::constants::WAKE_PI_INITIAL;
    use qf_fluids::{Composition, Mixture, Species};
    use qf_wall::spalding_y;

    fn air() -> Mixture {
        Mixture::ideal(
            Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)])
                .unwrap(),
        )
    }

    struct Fixture {
        grid: Grid,
        splines: PropertySplines,
        bulk: FlowState,
        wall: WallProps,
        r: f64,
    }

    fn fixture(t_m: f64, t_w: f64, u_m: f64) -> Fixture {
        let gas = air();
        let grid = Grid::new(ChannelKind::Axisymmetric, 0.01, DEFAULT_CELLS, DEFAULT_RATIO).unwrap();
        let splines = PropertySplines::build(&gas, 1e5, 250.0, 800.0, 201).unwrap();
        let bulk = FlowState::caloric(&gas, t_m, 1e5, u_m).unwrap();
        let wall = WallProps::from_splines(&splines, t_w).unwrap();
        Fixture {
            grid,
            splines,
            bulk,
            wall,
            r: gas.gas_constant(),
        }
    }

    fn context(fx: &Fixture, mode: SigmaMode) -> ProfileContext<'_> {
        ProfileContext {
            grid: &fx.grid,
            splines: &fx.splines,
            bulk: &fx.bulk,
            wall: fx.wall,
            d_h: 0.01,
            ideal_r: Some(fx.r),
            roughness: 0.0,
            wake_pi: WAKE_PI_INITIAL,
            sigma_mode: mode,
        }
    }

    #[test]
    fn profile_pins_wall_and_centre() {
        let fx = fixture(600.0, 400.0, 50.0);
        let ctx = context(&fx, SigmaMode::Petukhov);
        let p = ctx.reconstruct(605.0, 60.0).unwrap();
        let n = p.y.len();
        assert_eq!(p.u[0], 0.0);
        assert_eq!(p.tau[n - 1], 0.0);
        assert_relative_eq!(p.tau[0], p.tau_wall);
        assert_relative_eq!(p.u[n - 1], 60.0, max_relative = 1e-9);
        assert_relative_eq!(p.t[0], 400.0, max_relative = 1e-6);
        assert!(p.u.iter().all(|u| *u >= 0.0 && *u <= 60.0 * 1.001));
        assert!(p.tau_wall > 0.0);
    }

    #[test]
    fn shear_residual_vanishes() {
        let fx = fixture(600.0, 400.0, 50.0);
        let ctx = context(&fx, SigmaMode::Petukhov);
        let sr = petukhov(fx.bulk.pr, 4e-3);
        let h_hat = fx.splines.h(600.0).unwrap();
        let rho_hat = fx.splines.rho(600.0).unwrap();
        let cb = ctx.transform(&sr, h_hat, rho_hat, 600.0, 60.0).unwrap();
        let u_tau = ctx.shear_velocity(&cb, 60.0, 3.0).unwrap();
        let y_c = fx.wall.rho * u_tau * ctx.grid.half_width() / fx.wall.mu;
        let e = spalding_e(B_PLUS_SMOOTH, KARMAN);
        let f = spalding(B_PLUS_SMOOTH, KARMAN, e, y_c, None).unwrap();
        assert_relative_eq!(f, cb.shear_constant() * 60.0 / u_tau, max_relative = 1e-9);
        assert!((spalding_y(B_PLUS_SMOOTH, KARMAN, e, f) - y_c).abs() < 1e-6 * y_c);
    }

    #[test]
    fn shear_seed_does_not_matter() {
        let fx = fixture(600.0, 400.0, 50.0);
        let ctx = context(&fx, SigmaMode::Petukhov);
        let a = ctx.reconstruct(600.0, 60.0).unwrap();
        let sr = a.sigma_recovery;
        let h_hat = fx.splines.h(600.0).unwrap();
        let rho_hat = fx.splines.rho(600.0).unwrap();
        let cb = ctx.transform(&sr, h_hat, rho_hat, 600.0, 60.0).unwrap();
        let slow = ctx.shear_velocity(&cb, 60.0, 0.1).unwrap();
        let fast = ctx.shear_velocity(&cb, 60.0, 20.0).unwrap();
        assert_relative_eq!(slow, fast, max_relative = 1e-10);
    }

    #[test]
    fn roughness_raises_friction() {
        let fx = fixture(600.0, 400.0, 50.0);
        let smooth = context(&fx, SigmaMode::Petukhov).reconstruct(600.0, 60.0).unwrap();
        let mut rough_ctx = context(&fx, SigmaMode::Petukhov);
        rough_ctx.roughness = 5e-5;
        let rough = rough_ctx.reconstruct(600.0, 60.0).unwrap();
        assert!(rough.tau_wall > smooth.tau_wall);
    }

    #[test]
    fn van_driest_mode_produces_finite_sigma() {
        let fx = fixture(600.0, 400.0, 50.0);
        let p = context(&fx, SigmaMode::VanDriest).reconstruct(600.0, 60.0).unwrap();
        let sr = p.sigma_recovery;
        assert!(sr.sigma.is_finite() && sr.sigma.abs() <= 20.0);
        assert!(sr.r.is_finite() && sr.r.abs() <= 20.0);
    }
}
