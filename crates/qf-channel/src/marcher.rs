//! Element-by-element channel march coupled to the boundary layer.
//!
//! Each element integrates the channel ODE from its entry to the mid and
//! exit stations with the wall loads currently stored on its segments, then
//! re-solves the boundary layer at the fresh mid and exit states. The loop
//! repeats until the mid and exit states stop moving.

use crate::element::{Element, Segment};
use crate::error::{ChannelError, ChannelResult};
use crate::geometry::{Geometry, stations};
use crate::integrator::{Rk45, Rk45Config, State};
use crate::mesh::{MeshField, MeshFields, NodeFields};
use crate::ode::{ChannelOde, CompositionChange, Direction, Friction, Source};
use qf_boundary::{BoundaryLayer, FrictionMethod, Parameters};
use qf_core::numeric::relative_change;
use qf_fluids::{FlowState, Mixture};
use tracing::{debug, info, warn};

/// Marcher configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MarcherConfig {
    /// Three-node elements along the channel
    pub elements: usize,
    pub max_element_iterations: usize,
    /// Fixed-point tolerance on the mid and exit states
    pub tol: f64,
    pub rk45: Rk45Config,
    pub direction: Direction,
    /// Re-equilibrate the composition after every element
    pub reacting: bool,
}

impl Default for MarcherConfig {
    fn default() -> Self {
        Self {
            elements: 20,
            max_element_iterations: 500,
            tol: 1e-6,
            rk45: Rk45Config::default(),
            direction: Direction::Forward,
            reacting: false,
        }
    }
}

/// Inflow state `(T, p, u)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inflow {
    pub t: f64,
    pub p: f64,
    pub u: f64,
}

/// Result of one march.
#[derive(Debug, Clone, PartialEq)]
pub struct MarchSummary {
    pub mass_flow: f64,
    /// Heat absorbed by the fluid, `−∫q̇_w dA` [W]
    pub heat_to_fluid: f64,
    pub inlet: FlowState,
    pub outlet: FlowState,
    /// Fixed-point iterations of each element, in marching order
    pub iterations: Vec<usize>,
}

impl MarchSummary {
    /// `(ṁ Δh_t − Q) / |Q|`.
    pub fn energy_imbalance(&self) -> f64 {
        let rise = self.mass_flow * (self.outlet.h_t - self.inlet.h_t);
        (rise - self.heat_to_fluid) / self.heat_to_fluid.abs().max(f64::MIN_POSITIVE)
    }
}

/// Channel marcher; owns the geometry, the boundary-layer solver and the
/// `2E+1` segments.
#[derive(Debug)]
pub struct Marcher {
    geometry: Box<dyn Geometry>,
    bl: BoundaryLayer,
    config: MarcherConfig,
    rk: Rk45,
    segments: Vec<Segment>,
}

impl Marcher {
    pub fn new(geometry: Box<dyn Geometry>, bl: BoundaryLayer, config: MarcherConfig) -> ChannelResult<Self> {
        if config.elements == 0 {
            return Err(ChannelError::InvalidArg {
                what: "marcher needs at least one element",
            });
        }
        if config.max_element_iterations == 0 {
            return Err(ChannelError::InvalidArg {
                what: "max_element_iterations must be positive",
            });
        }
        let segments = stations(geometry.as_ref(), 2 * config.elements + 1)
            .into_iter()
            .map(|x| Segment::from_geometry(geometry.as_ref(), x))
            .collect();
        Ok(Self {
            rk: Rk45::new(config.rk45.clone()),
            geometry,
            bl,
            config,
            segments,
        })
    }

    pub fn config(&self) -> &MarcherConfig {
        &self.config
    }

    pub fn geometry(&self) -> &dyn Geometry {
        self.geometry.as_ref()
    }

    pub fn boundary_layer(&self) -> &BoundaryLayer {
        &self.bl
    }

    pub fn mixture(&self) -> &Mixture {
        self.bl.mixture()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Node store matching the segments, with a uniform wall temperature.
    pub fn mesh(&self, t_wall: f64) -> NodeFields {
        NodeFields::new(self.segments.iter().map(|s| s.x).collect())
            .with_uniform(MeshField::WallTemperature, t_wall)
    }

    /// March from the inflow to the outlet; wall temperatures are read from
    /// `mesh`, wall results written back to it.
    pub fn march(&mut self, mesh: &mut dyn MeshFields, inflow: Inflow) -> ChannelResult<MarchSummary> {
        if mesh.len() != self.segments.len() {
            return Err(ChannelError::InvalidArg {
                what: "mesh node count must match the segments",
            });
        }
        let n = self.config.elements;
        let forward = self.config.direction == Direction::Forward;
        let first = if forward { 0 } else { 2 * n };
        let inlet = self.solve_wall(mesh, first, inflow.t, inflow.p, inflow.u)?;
        let mass_flow = inlet.mass_flow();
        info!(
            mass_flow,
            t = inflow.t,
            p = inflow.p,
            u = inflow.u,
            elements = n,
            "channel march started"
        );

        let order: Vec<usize> = if forward { (0..n).collect() } else { (0..n).rev().collect() };
        let mut heat_to_fluid = 0.0;
        let mut iterations = Vec::with_capacity(n);
        let mut drift: Option<CompositionChange> = None;

        for e in order {
            let (lo, mid, hi) = (2 * e, 2 * e + 1, 2 * e + 2);
            let (i_in, i_out) = if forward { (lo, hi) } else { (hi, lo) };
            let iters = self.converge_element(mesh, e, (lo, mid, hi), (i_in, i_out), mass_flow, drift)?;
            iterations.push(iters);

            // α at the mid station is linearised between the end stations
            let (w_in, w_out) = (self.segments[i_in].wall, self.segments[i_out].wall);
            self.segments[mid].wall.alpha = 0.5 * (w_in.alpha + w_out.alpha);
            if w_in.q_wall * w_out.q_wall < 0.0 {
                warn!(
                    element = e,
                    x = self.segments[mid].x,
                    q_in = w_in.q_wall,
                    q_out = w_out.q_wall,
                    "wall heat flux changes sign across element; zeroing mid-station load"
                );
                self.segments[mid].wall.q_wall = 0.0;
                self.segments[mid].wall.alpha = 0.0;
            }
            mesh.set(MeshField::HeatFlux, mid, self.segments[mid].wall.q_wall)?;
            mesh.set(MeshField::Alpha, mid, self.segments[mid].wall.alpha)?;

            let element = Element::new(
                self.segments[lo].clone(),
                self.segments[hi].clone(),
                self.segments[mid].clone(),
            )?;
            heat_to_fluid -= element.simpson(|s| s.perimeter() * s.wall.q_wall);

            let exit = self.segments[i_out].flow()?.clone();
            info!(
                element = e,
                iterations = iters,
                x = exit.x,
                t = exit.t,
                p = exit.p,
                u = exit.u,
                "element converged"
            );

            if self.config.reacting {
                let before = self.bl.mixture().clone();
                self.bl.mixture_mut().remix_to_equilibrium(exit.t, exit.p)?;
                let dx = self.segments[i_out].x - self.segments[i_in].x;
                drift = Some(CompositionChange::between(
                    &before,
                    self.bl.mixture(),
                    exit.t,
                    exit.p,
                    dx,
                )?);
                let seg = &mut self.segments[i_out];
                let refreshed = FlowState::caloric(self.bl.mixture(), exit.t, exit.p, exit.u)?
                    .with_geometry(seg.area, seg.d_h, seg.x);
                seg.flow = Some(refreshed);
            }
        }

        let last = if forward { 2 * n } else { 0 };
        let outlet = self.segments[last].flow()?.clone();
        Ok(MarchSummary {
            mass_flow,
            heat_to_fluid,
            inlet,
            outlet,
            iterations,
        })
    }

    /// Fixed-point loop of one element; returns the iteration count.
    fn converge_element(
        &mut self,
        mesh: &mut dyn MeshFields,
        e: usize,
        (lo, mid, hi): (usize, usize, usize),
        (i_in, i_out): (usize, usize),
        mass_flow: f64,
        drift: Option<CompositionChange>,
    ) -> ChannelResult<usize> {
        // prime the downstream stations with the entry wall loads
        let primed = self.segments[i_in].wall;
        for i in [mid, i_out] {
            self.segments[i].wall.tau_wall = primed.tau_wall;
            self.segments[i].wall.q_wall = primed.q_wall;
        }
        let entry = self.segments[i_in].flow()?.clone();
        let scale = [entry.t, entry.p, entry.u];
        let z_in = State::new((1.0 / entry.rho).ln(), entry.u.ln(), entry.t.ln());
        let (x_in, x_mid, x_out) = (self.segments[i_in].x, self.segments[mid].x, self.segments[i_out].x);
        let mut previous: Option<[f64; 6]> = None;

        for iter in 1..=self.config.max_element_iterations {
            let element = Element::new(
                self.segments[lo].clone(),
                self.segments[hi].clone(),
                self.segments[mid].clone(),
            )?;
            let (z_mid, z_out) = {
                let mut ode = ChannelOde::new(self.bl.mixture(), Source::Element(&element), Friction::Element, mass_flow)?
                    .with_direction(self.config.direction);
                if let Some(change) = drift {
                    ode.set_composition_change(change);
                }
                let z_mid = self.rk.integrate(&mut ode, x_in, &z_in, x_mid)?.y;
                let z_out = self.rk.integrate(&mut ode, x_mid, &z_mid, x_out)?.y;
                (z_mid, z_out)
            };

            let m = self.solve_wall_ln(mesh, mid, &z_mid)?;
            let o = self.solve_wall_ln(mesh, i_out, &z_out)?;
            let current = [
                m.t / scale[0],
                m.p / scale[1],
                m.u / scale[2],
                o.t / scale[0],
                o.p / scale[1],
                o.u / scale[2],
            ];
            let change = previous.map_or(f64::INFINITY, |prev| relative_change(&current, &prev));
            debug!(element = e, iteration = iter, change, t_exit = o.t, p_exit = o.p, "element iteration");
            if change < self.config.tol {
                return Ok(iter);
            }
            previous = Some(current);
        }

        let exit = self.segments[i_out].flow()?;
        Err(ChannelError::TooManyIterations {
            what: "channel element",
            iterations: self.config.max_element_iterations,
            state: format!(
                "element {e}, x={} m, T={} K, p={} Pa, u={} m/s",
                exit.x, exit.t, exit.p, exit.u
            ),
        })
    }

    fn solve_wall_ln(&mut self, mesh: &mut dyn MeshFields, idx: usize, z: &State) -> ChannelResult<FlowState> {
        let y = z.map(f64::exp);
        let p = self.bl.mixture().pressure(y[0], y[2])?;
        self.solve_wall(mesh, idx, y[2], p, y[1])
    }

    /// Boundary layer at station `idx`; stores flow and wall state and
    /// writes the wall fields.
    fn solve_wall(&mut self, mesh: &mut dyn MeshFields, idx: usize, t: f64, p: f64, u: f64) -> ChannelResult<FlowState> {
        let (x, area, d_h) = {
            let s = &self.segments[idx];
            (s.x, s.area, s.d_h)
        };
        let t_wall = mesh.get(MeshField::WallTemperature, idx)?;
        self.bl.set_hydraulic_diameter(d_h)?;
        self.bl.set_wall_temperature(t_wall);
        // tables live on the isobar of the station being solved
        let rebuild = self.bl.method() == FrictionMethod::Messe
            && self.bl.splines().is_none_or(|s| s.pressure() != p);
        self.bl.set_flow_conditions(t, p, u, rebuild)?;
        let mut params = Parameters::new(x, area);
        self.bl.compute(&mut params, false)?;

        let flow = self
            .bl
            .bulk()
            .cloned()
            .ok_or(ChannelError::InvalidArg {
                what: "boundary layer lost its bulk state",
            })?
            .with_geometry(area, d_h, x);
        let wall = params.wall();
        for (field, value) in [
            (MeshField::HeatFlux, wall.q_wall),
            (MeshField::RecoveryTemperature, wall.t_recovery),
            (MeshField::Alpha, wall.alpha),
            (MeshField::FluidTemperature, flow.t),
            (MeshField::FluidPressure, flow.p),
            (MeshField::FluidMach, flow.ma),
        ] {
            mesh.set(field, idx, value)?;
        }
        let seg = &mut self.segments[idx];
        seg.flow = Some(flow.clone());
        seg.wall = wall;
        Ok(flow)
    }
}

/// March a geometry with closed-form wall loads (Moody friction,
/// Dittus–Boelter heat transfer) and no boundary-layer coupling.
pub fn march_closed_form(
    gas: &Mixture,
    geometry: &dyn Geometry,
    inflow: Inflow,
    t_wall: f64,
    roughness: f64,
    direction: Direction,
    rk45: &Rk45Config,
) -> ChannelResult<FlowState> {
    let (x0, x1) = match direction {
        Direction::Forward => (geometry.start(), geometry.end()),
        Direction::Reverse => (geometry.end(), geometry.start()),
    };
    let inlet = FlowState::caloric(gas, inflow.t, inflow.p, inflow.u)?.with_geometry(
        geometry.area(x0),
        geometry.hydraulic_diameter(x0),
        x0,
    );
    let friction = Friction::DittusBoelter { t_wall, roughness };
    let mut ode = ChannelOde::new(gas, Source::Geometry(geometry), friction, inlet.mass_flow())?.with_direction(direction);
    let z0 = State::new((1.0 / inlet.rho).ln(), inlet.u.ln(), inlet.t.ln());
    let report = Rk45::new(rk45.clone()).integrate(&mut ode, x0, &z0, x1)?;
    let y = report.y.map(f64::exp);
    let p = gas.pressure(y[0], y[2])?;
    debug!(substeps = report.accepted, rejected = report.rejected, "closed-form march");
    Ok(FlowState::caloric(gas, y[2], p, y[1])?.with_geometry(
        geometry.area(x1),
        geometry.hydraulic_diameter(x1),
        x1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CylindricalDuct;
    use approx::assert_relative_eq;
    use qf_boundary::{ChannelKind, SigmaMode};
    use qf_fluids::{Composition, Species};

    fn air() -> Mixture {
        Mixture::ideal(
            Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap(),
        )
    }

    #[test]
    fn closed_form_heated_duct() {
        let gas = air();
        let duct = CylindricalDuct::new(0.01, 0.5).unwrap();
        let inflow = Inflow {
            t: 300.0,
            p: 2e5,
            u: 30.0,
        };
        let out = march_closed_form(&gas, &duct, inflow, 500.0, 0.0, Direction::Forward, &Rk45Config::default())
            .unwrap();
        let inlet = FlowState::caloric(&gas, 300.0, 2e5, 30.0).unwrap();
        assert!(out.t > 300.0 && out.t < 500.0, "T = {}", out.t);
        assert!(out.p < 2e5);
        assert_relative_eq!(out.rho * out.u, inlet.rho * inlet.u, max_relative = 1e-6);
    }

    #[test]
    fn marcher_rejects_mismatched_mesh() {
        let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        let duct = CylindricalDuct::new(0.01, 0.1).unwrap();
        let mut marcher = Marcher::new(
            Box::new(duct),
            bl,
            MarcherConfig {
                elements: 2,
                ..MarcherConfig::default()
            },
        )
        .unwrap();
        assert_eq!(marcher.segments().len(), 5);
        let mut mesh = NodeFields::new(vec![0.0; 3]);
        let inflow = Inflow {
            t: 300.0,
            p: 1e5,
            u: 20.0,
        };
        assert!(marcher.march(&mut mesh, inflow).is_err());
    }

    #[test]
    fn profile_tables_follow_station_pressure() {
        let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Messe, SigmaMode::Petukhov)
            .unwrap();
        let duct = CylindricalDuct::new(0.01, 0.1).unwrap();
        let mut marcher = Marcher::new(
            Box::new(duct),
            bl,
            MarcherConfig {
                elements: 2,
                ..MarcherConfig::default()
            },
        )
        .unwrap();
        let mut mesh = marcher.mesh(400.0);
        let inflow = Inflow {
            t: 300.0,
            p: 1e5,
            u: 30.0,
        };
        let summary = marcher.march(&mut mesh, inflow).unwrap();
        assert!(summary.outlet.p < inflow.p);
        let table_p = marcher.boundary_layer().splines().unwrap().pressure();
        assert!(
            marcher.segments().iter().filter_map(|s| s.flow.as_ref()).any(|f| f.p == table_p),
            "tables at {table_p} Pa match no station"
        );
        assert!(table_p < inflow.p);
    }
}
