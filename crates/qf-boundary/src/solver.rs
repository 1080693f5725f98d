//! `BoundaryLayer`: wall fluxes of a channel cross-section.

use crate::correlations::{
    WallFlux, WallInputs, bartz, eckert, lebedinsky_kalmykov, pizzarelli, transfer_coefficient,
};
use crate::error::{BoundaryError, BoundaryResult};
use crate::grid::{ChannelKind, DEFAULT_CELLS, DEFAULT_RATIO, Grid};
use crate::methods::{FrictionMethod, PureMethane, SigmaMode};
use crate::newton::{Bounds, NewtonOutcome, OuterNewtonConfig, StallReason, damped_newton};
use crate::parameters::{Parameters, Slot, WallState};
use crate::profile::{Profile, ProfileContext, WallProps};
use nalgebra::DVector;
use qf_core::constants::{TECHNICAL_ROUGHNESS_FACTOR, WAKE_PI_INITIAL};
use qf_fluids::{FlowState, Mixture, PropertySplines, SplineMatrices, T_MAX, T_MIN};
use tracing::{debug, info, warn};

/// Spline range margins around the wall and bulk temperatures.
const SPLINE_LOWER_FACTOR: f64 = 0.75;
const SPLINE_UPPER_FACTOR: f64 = 1.1;

/// Initial centre velocity relative to the bulk velocity.
const INITIAL_CENTER_VELOCITY: f64 = 1.2;

/// Centre-velocity excess of the Eckert restart, in friction velocities.
const RESTART_FRICTION_VELOCITIES: f64 = 3.75;

/// Boundary-layer solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayerConfig {
    /// Cells across the half channel
    pub cells: usize,
    /// Geometric growth of successive cells
    pub ratio: f64,
    /// Coles wake parameter `Π`
    pub wake_pi: f64,
    /// Spline knots; `None` picks the mixture default
    pub spline_points: Option<usize>,
    pub outer: OuterNewtonConfig,
}

impl Default for BoundaryLayerConfig {
    fn default() -> Self {
        Self {
            cells: DEFAULT_CELLS,
            ratio: DEFAULT_RATIO,
            wake_pi: WAKE_PI_INITIAL,
            spline_points: None,
            outer: OuterNewtonConfig::default(),
        }
    }
}

/// Solver result of one `compute`.
#[derive(Debug, Clone, PartialEq)]
struct Solution {
    flux: WallFlux,
    t_center: f64,
    u_center: f64,
    errors: [f64; 3],
    y_plus_1: f64,
}

/// Wall-flux solver for one channel cross-section.
///
/// Set the mixture, channel kind and methods at construction, then the
/// hydraulic diameter, wall temperature and bulk flow, and call
/// [`BoundaryLayer::compute`].
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    gas: Mixture,
    kind: ChannelKind,
    method: FrictionMethod,
    sigma_mode: SigmaMode,
    config: BoundaryLayerConfig,
    grid: Option<Grid>,
    t_wall: f64,
    roughness: f64,
    bartz_factor: Option<f64>,
    bulk: Option<FlowState>,
    splines: Option<PropertySplines>,
    profile: Option<Profile>,
}

impl BoundaryLayer {
    pub fn new(
        gas: Mixture,
        kind: ChannelKind,
        method: FrictionMethod,
        sigma_mode: SigmaMode,
    ) -> BoundaryResult<Self> {
        if method.requires_methane() {
            PureMethane::check(&gas)?;
        }
        if sigma_mode == SigmaMode::VanDriest {
            return Err(BoundaryError::NotSupported {
                what: "van Driest sigma mode needs with_van_driest_sigma",
            });
        }
        Ok(Self {
            gas,
            kind,
            method,
            sigma_mode,
            config: BoundaryLayerConfig::default(),
            grid: None,
            t_wall: 300.0,
            roughness: 0.0,
            bartz_factor: None,
            bulk: None,
            splines: None,
            profile: None,
        })
    }

    pub fn with_config(mut self, config: BoundaryLayerConfig) -> Self {
        self.config = config;
        self.grid = None;
        self
    }

    /// Opt in to the van Driest profile integrals for `σ` and `r`.
    ///
    /// Unvalidated against measurements; case files cannot select it.
    pub fn with_van_driest_sigma(mut self) -> Self {
        self.sigma_mode = SigmaMode::VanDriest;
        self
    }

    pub fn config(&self) -> &BoundaryLayerConfig {
        &self.config
    }

    pub fn mixture(&self) -> &Mixture {
        &self.gas
    }

    /// Mutable mixture access; property tables are dropped because the
    /// composition may change.
    pub fn mixture_mut(&mut self) -> &mut Mixture {
        self.splines = None;
        &mut self.gas
    }

    pub fn method(&self) -> FrictionMethod {
        self.method
    }

    pub fn sigma_mode(&self) -> SigmaMode {
        self.sigma_mode
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn wall_temperature(&self) -> f64 {
        self.t_wall
    }

    /// Technical roughness `k_tech` [m].
    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    pub fn bulk(&self) -> Option<&FlowState> {
        self.bulk.as_ref()
    }

    pub fn splines(&self) -> Option<&PropertySplines> {
        self.splines.as_ref()
    }

    /// Profile of the last Messe solve.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Bulk state `(T, p, u)`; with `update_tables` the Messe property
    /// splines are rebuilt at `p`.
    pub fn set_flow_conditions(&mut self, t: f64, p: f64, u: f64, update_tables: bool) -> BoundaryResult<()> {
        self.set_bulk(t, p, u)?;
        if self.method == FrictionMethod::Messe {
            self.ensure_tables(update_tables)?;
        }
        Ok(())
    }

    /// Bulk state with externally built spline coefficients.
    pub fn set_flow_conditions_with_splines(
        &mut self,
        t: f64,
        p: f64,
        u: f64,
        splines: &SplineMatrices,
    ) -> BoundaryResult<()> {
        self.set_bulk(t, p, u)?;
        self.splines = Some(PropertySplines::from_matrices(splines)?);
        Ok(())
    }

    fn set_bulk(&mut self, t: f64, p: f64, u: f64) -> BoundaryResult<()> {
        if !(T_MIN..=T_MAX).contains(&t) {
            return Err(qf_fluids::FluidError::OutOfRange {
                what: "bulk temperature",
                value: t,
                min: T_MIN,
                max: T_MAX,
            }
            .into());
        }
        let mut state = FlowState::caloric(&self.gas, t, p, u)?;
        if let Some(g) = &self.grid {
            state = state.with_geometry(g.area(), self.hydraulic_diameter(), 0.0);
        }
        self.bulk = Some(state);
        Ok(())
    }

    fn hydraulic_diameter(&self) -> f64 {
        match (&self.grid, self.kind) {
            (Some(g), ChannelKind::Axisymmetric) => 2.0 * g.half_width(),
            (Some(g), ChannelKind::Planar) => 4.0 * g.half_width(),
            (None, _) => 0.0,
        }
    }

    pub fn set_hydraulic_diameter(&mut self, d_h: f64) -> BoundaryResult<()> {
        let grid = Grid::new(self.kind, d_h, self.config.cells, self.config.ratio)?;
        if let Some(b) = self.bulk.take() {
            self.bulk = Some(b.with_geometry(grid.area(), d_h, 0.0));
        }
        self.grid = Some(grid);
        Ok(())
    }

    /// Wall temperature, clamped to the property range.
    pub fn set_wall_temperature(&mut self, t_w: f64) {
        self.t_wall = t_w.clamp(T_MIN, T_MAX);
    }

    /// Arithmetic mean roughness `R_a`; stored as `k_tech = 4.2 R_a`.
    pub fn set_surface_roughness(&mut self, r_a: f64) -> BoundaryResult<()> {
        if !(r_a.is_finite() && r_a >= 0.0) {
            return Err(BoundaryError::InvalidArg {
                what: "surface roughness must be non-negative",
            });
        }
        self.roughness = TECHNICAL_ROUGHNESS_FACTOR * r_a;
        Ok(())
    }

    /// Throat diameter and throat curvature radius for Bartz.
    pub fn set_bartz_geometry_params(&mut self, d_t: f64, r_c: f64) -> BoundaryResult<()> {
        if !(d_t > 0.0 && r_c > 0.0 && d_t.is_finite() && r_c.is_finite()) {
            return Err(BoundaryError::InvalidGeometry {
                what: "throat diameter and curvature radius must be positive",
            });
        }
        self.bartz_factor = Some((d_t / r_c).powf(0.1));
        Ok(())
    }

    fn spline_range(&self, bulk: &FlowState) -> (f64, f64) {
        let t_dyn = bulk.t + bulk.u * bulk.u / bulk.cp;
        (
            SPLINE_LOWER_FACTOR * self.t_wall.min(bulk.t),
            SPLINE_UPPER_FACTOR * self.t_wall.max(t_dyn),
        )
    }

    fn ensure_tables(&mut self, rebuild: bool) -> BoundaryResult<()> {
        let bulk = self.bulk.as_ref().ok_or(BoundaryError::InvalidArg {
            what: "flow conditions not set",
        })?;
        let (want_lo, want_hi) = self.spline_range(bulk);
        let covers = |s: &PropertySplines| {
            let (lo, hi) = s.t_range();
            lo <= want_lo.max(T_MIN) && hi >= want_hi.min(T_MAX)
        };
        let stale = match &self.splines {
            None => true,
            Some(s) => rebuild || !covers(s),
        };
        if stale {
            let (lo, hi) = (want_lo, want_hi);
            let points = self
                .config
                .spline_points
                .unwrap_or_else(|| PropertySplines::default_points(&self.gas));
            debug!(t_lo = lo, t_hi = hi, p = bulk.p, points, "building property splines");
            self.splines = Some(PropertySplines::build(&self.gas, bulk.p, lo, hi, points)?);
        }
        Ok(())
    }

    /// Fill slots 2–23 of `params` for the current wall.
    pub fn compute(&mut self, params: &mut Parameters, update_tables: bool) -> BoundaryResult<()> {
        let sol = self.solve(update_tables)?;
        self.write(params, &sol)
    }

    /// Fill slots 24–31 for a second wall at `t_w2`; the first-wall slots
    /// keep their previous values.
    pub fn compute_second_wall(&mut self, params: &mut Parameters, t_w2: f64) -> BoundaryResult<()> {
        if !params.has_second_wall() {
            return Err(BoundaryError::InvalidArg {
                what: "parameters record has no second-wall slots",
            });
        }
        let saved = self.t_wall;
        self.set_wall_temperature(t_w2);
        let result = self.solve(false).map(|sol| self.wall_state(&sol));
        self.t_wall = saved;
        params.set_wall(Slot::TWall2, &result?)
    }

    fn solve(&mut self, update_tables: bool) -> BoundaryResult<Solution> {
        let bulk = self.bulk.clone().ok_or(BoundaryError::InvalidArg {
            what: "flow conditions not set",
        })?;
        let Some(grid) = &self.grid else {
            return Err(BoundaryError::InvalidArg {
                what: "hydraulic diameter not set",
            });
        };
        if !(bulk.u > 0.0) {
            return Err(BoundaryError::InvalidArg {
                what: "bulk velocity must be positive",
            });
        }
        if self.method == FrictionMethod::Messe {
            return self.solve_messe(&bulk, update_tables);
        }
        let first_node = grid.y().get(1).copied().unwrap_or(0.0);
        let d_h = self.hydraulic_diameter();
        let inputs = WallInputs {
            gas: &self.gas,
            bulk: &bulk,
            t_wall: self.t_wall,
            d_h,
            roughness: self.roughness,
        };

        let flux = match self.method {
            FrictionMethod::Messe | FrictionMethod::Eckert => eckert(&inputs)?,
            FrictionMethod::Bartz => bartz(&inputs, self.bartz_factor)?,
            FrictionMethod::Pizzarelli => pizzarelli(&inputs)?,
            FrictionMethod::LebedinskyKalmykov => lebedinsky_kalmykov(&inputs)?,
        };
        let wall = self.gas.properties(self.t_wall, bulk.p)?;
        let u_tau = (flux.tau_wall.abs() / wall.caloric.rho()).sqrt();
        let y_plus_1 = wall.caloric.rho() * u_tau * first_node / wall.transport.mu;
        info!(
            method = %self.method,
            t_wall = self.t_wall,
            tau_wall = flux.tau_wall,
            q_wall = flux.q_wall,
            "wall fluxes"
        );
        Ok(Solution {
            flux,
            t_center: bulk.t,
            u_center: bulk.u,
            errors: [0.0; 3],
            y_plus_1,
        })
    }

    fn solve_messe(&mut self, bulk: &FlowState, update_tables: bool) -> BoundaryResult<Solution> {
        self.ensure_tables(update_tables)?;
        let (Some(grid), Some(splines)) = (self.grid.as_ref(), self.splines.as_ref()) else {
            return Err(BoundaryError::InvalidArg {
                what: "grid or property splines missing",
            });
        };
        let d_h = self.hydraulic_diameter();
        let ctx = ProfileContext {
            grid,
            splines,
            bulk,
            wall: WallProps::from_splines(splines, self.t_wall)?,
            d_h,
            ideal_r: self.gas.eos().is_ideal().then(|| self.gas.gas_constant()),
            roughness: self.roughness,
            wake_pi: self.config.wake_pi,
            sigma_mode: self.sigma_mode,
        };

        let cfg = &self.config.outer;
        let (t_lo, t_hi) = splines.t_range();
        let bounds = Bounds {
            lower: vec![t_lo, 1e-6 * bulk.u],
            upper: vec![t_hi, f64::INFINITY],
        };
        let steps = [cfg.fd_relative_step * bulk.t, cfg.fd_relative_step * bulk.u];
        let residual = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            let p = ctx.reconstruct(x[0], x[1])?;
            Ok(DVector::from_vec(vec![p.err_mass, p.err_momentum]))
        };

        let x0 = DVector::from_vec(vec![bulk.t, INITIAL_CENTER_VELOCITY * bulk.u]);
        let mut outcome = damped_newton(x0, &residual, &steps, &bounds, cfg.omega, cfg);
        if let NewtonOutcome::Stalled { reason, residual_norm, .. } = &outcome {
            let eckert_flux = eckert(&WallInputs {
                gas: &self.gas,
                bulk,
                t_wall: self.t_wall,
                d_h,
                roughness: self.roughness,
            })?;
            let rho_w = ctx.wall.rho;
            let u_tau = (eckert_flux.tau_wall.abs() / rho_w).sqrt();
            let u_hat = bulk.u + RESTART_FRICTION_VELOCITIES * u_tau;
            let t_hat = (bulk.t - (self.t_wall - bulk.t) * (u_hat - bulk.u) / bulk.u).clamp(t_lo, t_hi);
            warn!(
                ?reason,
                residual = *residual_norm,
                t_center = t_hat,
                u_center = u_hat,
                "outer Newton stalled; restarting from Eckert estimate"
            );
            outcome = damped_newton(
                DVector::from_vec(vec![t_hat, u_hat]),
                &residual,
                &steps,
                &bounds,
                cfg.omega_restart,
                cfg,
            );
        }

        let x = match outcome {
            NewtonOutcome::Converged { x, iterations, residual_norm } => {
                debug!(iterations, residual = residual_norm, "outer Newton converged");
                x
            }
            NewtonOutcome::Stalled {
                reason: StallReason::Trial(e),
                ..
            } => return Err(e),
            NewtonOutcome::Stalled {
                best,
                residual_norm,
                iterations,
                ..
            } => {
                return Err(BoundaryError::TooManyIterations {
                    what: "boundary-layer centre state",
                    iterations,
                    state: format!(
                        "T_c={} K, u_c={} m/s, residual={residual_norm}, T_m={} K, p={} Pa, u_m={} m/s, T_w={} K",
                        best[0], best[1], bulk.t, bulk.p, bulk.u, self.t_wall
                    ),
                });
            }
        };

        let profile = ctx.reconstruct(x[0], x[1])?;
        let h_wall = ctx.wall.h;
        let h_recovery = profile.h_recovery();
        let q_wall = profile.q_wall(h_wall);
        let t_recovery = match splines.t_from_h(h_recovery) {
            Ok(t) => t,
            Err(_) => self.gas.t_from_h_near(h_recovery, bulk.p, profile.t_center)?,
        };
        let flux = WallFlux {
            tau_wall: profile.tau_wall,
            q_wall,
            h_wall,
            h_recovery,
            t_recovery,
            alpha: transfer_coefficient(q_wall, t_recovery, self.t_wall),
            sigma_recovery: profile.sigma_recovery,
        };
        info!(
            method = %self.method,
            t_wall = self.t_wall,
            tau_wall = flux.tau_wall,
            q_wall = flux.q_wall,
            t_center = profile.t_center,
            u_center = profile.u_center,
            "wall fluxes"
        );
        let sol = Solution {
            flux,
            t_center: profile.t_center,
            u_center: profile.u_center,
            errors: [profile.err_mass, profile.err_momentum, profile.err_energy],
            y_plus_1: profile.y_plus_1(),
        };
        self.profile = Some(profile);
        Ok(sol)
    }

    fn wall_state(&self, sol: &Solution) -> WallState {
        WallState {
            t_wall: self.t_wall,
            tau_wall: sol.flux.tau_wall,
            q_wall: sol.flux.q_wall,
            h_wall: sol.flux.h_wall,
            y_plus_1: sol.y_plus_1,
            t_recovery: sol.flux.t_recovery,
            h_recovery: sol.flux.h_recovery,
            alpha: sol.flux.alpha,
        }
    }

    fn write(&self, params: &mut Parameters, sol: &Solution) -> BoundaryResult<()> {
        let bulk = self.bulk.as_ref().ok_or(BoundaryError::InvalidArg {
            what: "flow conditions not set",
        })?;
        let d_h = self.hydraulic_diameter();
        let values = [
            (Slot::DHydraulic, d_h),
            (Slot::TMean, bulk.t),
            (Slot::PMean, bulk.p),
            (Slot::UMean, bulk.u),
            (Slot::MaMean, bulk.ma),
            (Slot::HMean, bulk.h),
            (Slot::SMean, bulk.s),
            (Slot::PrMean, bulk.pr),
            (Slot::ReDh, bulk.rho * bulk.u * d_h / bulk.mu),
            (Slot::TCenter, sol.t_center),
            (Slot::UCenter, sol.u_center),
            (Slot::ErrMass, sol.errors[0]),
            (Slot::ErrMomentum, sol.errors[1]),
            (Slot::ErrEnergy, sol.errors[2]),
        ];
        for (slot, v) in values {
            params.set(slot, v)?;
        }
        params.set_wall(Slot::TWall, &self.wall_state(sol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qf_fluids::{Composition, Species};

    fn air() -> Mixture {
        Mixture::ideal(
            Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)])
                .unwrap(),
        )
    }

    #[test]
    fn compute_needs_setup() {
        let mut bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        let mut params = Parameters::new(0.0, 7.85e-5);
        assert!(bl.compute(&mut params, false).is_err());
        bl.set_flow_conditions(300.0, 1e5, 30.0, false).unwrap();
        assert!(bl.compute(&mut params, false).is_err());
        bl.set_hydraulic_diameter(0.01).unwrap();
        bl.set_wall_temperature(350.0);
        bl.compute(&mut params, false).unwrap();
        assert_eq!(params.get(Slot::DHydraulic), 0.01);
        assert_eq!(params.get(Slot::TWall), 350.0);
        assert_eq!(params.get(Slot::ErrMass), 0.0);
    }

    #[test]
    fn van_driest_needs_explicit_opt_in() {
        assert!(matches!(
            BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Messe, SigmaMode::VanDriest),
            Err(BoundaryError::NotSupported { .. })
        ));
        let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Messe, SigmaMode::Petukhov)
            .unwrap()
            .with_van_driest_sigma();
        assert_eq!(bl.sigma_mode(), SigmaMode::VanDriest);
    }

    #[test]
    fn wall_temperature_is_clamped() {
        let mut bl = BoundaryLayer::new(air(), ChannelKind::Planar, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        bl.set_wall_temperature(1e5);
        assert_eq!(bl.wall_temperature(), T_MAX);
        bl.set_wall_temperature(1.0);
        assert_eq!(bl.wall_temperature(), T_MIN);
    }

    #[test]
    fn roughness_uses_technical_factor() {
        let mut bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        bl.set_surface_roughness(1e-6).unwrap();
        assert!((bl.roughness() - 4.2e-6).abs() < 1e-18);
        assert!(bl.set_surface_roughness(-1.0).is_err());
    }

    #[test]
    fn methane_methods_need_methane() {
        assert!(
            BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Pizzarelli, SigmaMode::Petukhov)
                .is_err()
        );
    }

    #[test]
    fn out_of_range_bulk_temperature() {
        let mut bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        assert!(bl.set_flow_conditions(50.0, 1e5, 30.0, false).is_err());
    }

    #[test]
    fn bartz_geometry_is_validated() {
        let mut bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Bartz, SigmaMode::Petukhov)
            .unwrap();
        assert!(bl.set_bartz_geometry_params(0.0, 0.01).is_err());
        bl.set_bartz_geometry_params(0.05, 0.05).unwrap();
    }
}
