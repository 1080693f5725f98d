//! Lossless channel: static states from total conditions.
//!
//! Every station lies on the isentrope `s = s_t` with `h + u²/2 = h_t`.
//! The critical state at the throat fixes the mass flow; each station then
//! carries that mass flow on the subsonic or supersonic branch. Per-station
//! property tables are cached for the boundary-layer pass that follows.

use crate::element::Segment;
use crate::error::{ChannelError, ChannelResult};
use crate::geometry::{Geometry, stations};
use crate::mesh::{MeshField, MeshFields, NodeFields};
use crate::moc::MocProfile;
use crate::ode::Direction;
use qf_boundary::{BoundaryLayer, Parameters};
use qf_fluids::{Caloric, FlowState, Mixture, PropertySplines, SplineMatrices};
use std::str::FromStr;
use tracing::{debug, info};

/// Tolerance of the bracketed solves in `ln p`.
const LNP_TOL: f64 = 1e-12;
const ROOT_MAX_ITERATIONS: usize = 200;
/// Halvings of the lower pressure bracket.
const BRACKET_HALVINGS: usize = 60;
const EQUILIBRIUM_MAX_ITERATIONS: usize = 50;
const EQUILIBRIUM_TOL: f64 = 1e-10;
/// Table range margins around wall and total temperature.
const TABLE_LOWER_FACTOR: f64 = 0.75;
const TABLE_UPPER_FACTOR: f64 = 1.1;

/// Which branch the stations are solved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Subsonic everywhere, marched backwards from the throat.
    #[default]
    Chamber,
    /// Subsonic upstream of the throat, supersonic downstream, marched forwards.
    Nozzle,
}

impl FromStr for Strategy {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chamber" | "combustor" => Ok(Strategy::Chamber),
            "nozzle" => Ok(Strategy::Nozzle),
            _ => Err(ChannelError::InvalidArg {
                what: "unknown isotropic strategy",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsotropicConfig {
    pub stations: usize,
    /// Re-equilibrate the composition at every static state
    pub equilibrium: bool,
    /// Order of the boundary-layer pass
    pub direction: Direction,
    /// Sonic area; the smallest station area when `None`
    pub throat_area: Option<f64>,
    pub spline_points: Option<usize>,
}

impl Default for IsotropicConfig {
    fn default() -> Self {
        Self {
            stations: 41,
            equilibrium: false,
            direction: Direction::Forward,
            throat_area: None,
            spline_points: None,
        }
    }
}

/// Sonic state at the throat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalState {
    pub t: f64,
    pub p: f64,
    /// Equal to the speed of sound
    pub u: f64,
    pub area: f64,
    pub mass_flow: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Total {
    t: f64,
    p: f64,
    h: f64,
    s: f64,
    gamma: f64,
}

/// Isentropic channel solver.
#[derive(Debug)]
pub struct IsotropicChannel {
    geometry: Box<dyn Geometry>,
    bl: BoundaryLayer,
    strategy: Strategy,
    config: IsotropicConfig,
    work: Mixture,
    total: Option<Total>,
    critical: Option<CriticalState>,
    segments: Vec<Segment>,
    compositions: Vec<Vec<f64>>,
    tables: Vec<SplineMatrices>,
}

impl IsotropicChannel {
    pub fn new(
        geometry: Box<dyn Geometry>,
        bl: BoundaryLayer,
        strategy: Strategy,
        config: IsotropicConfig,
    ) -> ChannelResult<Self> {
        if config.stations < 2 {
            return Err(ChannelError::InvalidArg {
                what: "isotropic channel needs at least two stations",
            });
        }
        if let Some(a) = config.throat_area {
            if !(a > 0.0 && a.is_finite()) {
                return Err(ChannelError::InvalidGeometry {
                    what: "throat area must be positive",
                });
            }
        }
        let segments = stations(geometry.as_ref(), config.stations)
            .into_iter()
            .map(|x| Segment::from_geometry(geometry.as_ref(), x))
            .collect();
        Ok(Self {
            work: bl.mixture().clone(),
            geometry,
            bl,
            strategy,
            config,
            total: None,
            critical: None,
            segments,
            compositions: Vec::new(),
            tables: Vec::new(),
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn critical(&self) -> Option<&CriticalState> {
        self.critical.as_ref()
    }

    /// Cached table coefficients, one set per station.
    pub fn tables(&self) -> &[SplineMatrices] {
        &self.tables
    }

    /// Mass fractions of each station.
    pub fn compositions(&self) -> &[Vec<f64>] {
        &self.compositions
    }

    pub fn boundary_layer(&self) -> &BoundaryLayer {
        &self.bl
    }

    /// Node store matching the stations, with a uniform wall temperature.
    pub fn mesh(&self, t_wall: f64) -> NodeFields {
        NodeFields::new(self.segments.iter().map(|s| s.x).collect())
            .with_uniform(MeshField::WallTemperature, t_wall)
    }

    /// Stagnation state; fixes `h_t` and `s_t`.
    pub fn set_total(&mut self, t: f64, p: f64) -> ChannelResult<()> {
        if self.config.equilibrium {
            self.work.remix_to_equilibrium(t, p)?;
        }
        let c = self.work.caloric(t, p)?;
        self.total = Some(Total {
            t,
            p,
            h: c.h,
            s: c.s,
            gamma: c.gamma(),
        });
        self.critical = None;
        Ok(())
    }

    fn total(&self) -> ChannelResult<Total> {
        self.total.clone().ok_or(ChannelError::InvalidArg {
            what: "total state not set",
        })
    }

    /// State on the isentrope at pressure `p`.
    fn on_isentrope(&mut self, p: f64) -> ChannelResult<Caloric> {
        let tot = self.total()?;
        let guess = tot.t * (p / tot.p).powf((tot.gamma - 1.0) / tot.gamma);
        let mut t = self.work.t_from_s_near(tot.s, p, guess)?;
        if self.config.equilibrium {
            let mut settled = false;
            for _ in 0..EQUILIBRIUM_MAX_ITERATIONS {
                self.work.remix_to_equilibrium(t, p)?;
                let next = self.work.t_from_s_near(tot.s, p, t)?;
                let done = (next - t).abs() <= EQUILIBRIUM_TOL * t;
                t = next;
                if done {
                    settled = true;
                    break;
                }
            }
            if !settled {
                return Err(ChannelError::TooManyIterations {
                    what: "equilibrium isentrope",
                    iterations: EQUILIBRIUM_MAX_ITERATIONS,
                    state: format!("p={p} Pa, T={t} K"),
                });
            }
        }
        Ok(self.work.caloric(t, p)?)
    }

    fn velocity(h_t: f64, c: &Caloric) -> f64 {
        (2.0 * (h_t - c.h)).max(0.0).sqrt()
    }

    /// Root of `residual` along the isentrope between `ln p_hi` and a lower
    /// bound found by halving from `ln p_hi`, or inside `[ln_a, ln_b]`.
    fn isentrope_root<F>(&mut self, bracket: Bracket, residual: F) -> ChannelResult<f64>
    where
        F: Fn(&Caloric, f64) -> f64,
    {
        let h_t = self.total()?.h;
        let eval = |this: &mut Self, ln_p: f64| -> ChannelResult<f64> {
            let c = this.on_isentrope(ln_p.exp())?;
            Ok(residual(&c, Self::velocity(h_t, &c)))
        };
        let (mut a, mut b) = match bracket {
            Bracket::Between(a, b) => (a, b),
            Bracket::Below(b) => (b - std::f64::consts::LN_2, b),
        };
        let mut fa = eval(self, a)?;
        let mut fb = eval(self, b)?;
        if let Bracket::Below(_) = bracket {
            let mut halvings = 0;
            while fa * fb > 0.0 {
                halvings += 1;
                if halvings > BRACKET_HALVINGS {
                    return Err(ChannelError::InvalidGeometry {
                        what: "no isentropic state on the supersonic branch",
                    });
                }
                a -= std::f64::consts::LN_2;
                fa = eval(self, a)?;
            }
        }
        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        if fa * fb > 0.0 {
            return Err(ChannelError::InvalidGeometry {
                what: "no isentropic state in the pressure bracket",
            });
        }
        // Illinois variant of regula falsi
        for _ in 0..ROOT_MAX_ITERATIONS {
            let c = b - fb * (b - a) / (fb - fa);
            let fc = eval(self, c)?;
            if fc == 0.0 {
                return Ok(c);
            }
            if fc * fb < 0.0 {
                a = b;
                fa = fb;
            } else {
                fa *= 0.5;
            }
            b = c;
            fb = fc;
            if (b - a).abs() <= LNP_TOL * (1.0 + b.abs()) {
                return Ok(b);
            }
        }
        Err(ChannelError::TooManyIterations {
            what: "isentropic pressure",
            iterations: ROOT_MAX_ITERATIONS,
            state: format!("ln p in [{a}, {b}]"),
        })
    }

    fn throat(&self) -> (usize, f64) {
        let mut best = 0;
        for (i, s) in self.segments.iter().enumerate() {
            if s.area < self.segments[best].area {
                best = i;
            }
        }
        (best, self.config.throat_area.unwrap_or(self.segments[best].area))
    }

    /// Sonic state `h + c²/2 = h_t`, `s = s_t`, and the critical mass flow.
    pub fn critical_state(&mut self) -> ChannelResult<CriticalState> {
        let tot = self.total()?;
        let ln_pt = tot.p.ln();
        let ln_p = self.isentrope_root(Bracket::Below(ln_pt), |c, u| (u * u - c.c * c.c) / (c.c * c.c))?;
        let c = self.on_isentrope(ln_p.exp())?;
        let u = Self::velocity(tot.h, &c);
        let (_, area) = self.throat();
        let crit = CriticalState {
            t: c.t,
            p: c.p,
            u,
            area,
            mass_flow: u / c.v * area,
        };
        info!(t = crit.t, p = crit.p, mass_flow = crit.mass_flow, "critical state");
        self.critical = Some(crit);
        Ok(crit)
    }

    fn ensure_critical(&mut self) -> ChannelResult<CriticalState> {
        match self.critical {
            Some(c) => Ok(c),
            None => self.critical_state(),
        }
    }

    /// Static state of every station carrying the critical mass flow.
    pub fn solve_static(&mut self) -> ChannelResult<()> {
        let crit = self.ensure_critical()?;
        let (i_throat, a_star) = self.throat();
        let n = self.segments.len();
        let order: Vec<usize> = match self.strategy {
            Strategy::Chamber => (0..n).rev().collect(),
            Strategy::Nozzle => (0..n).collect(),
        };
        self.compositions = vec![Vec::new(); n];
        let ln_pt = self.total()?.p.ln();
        let ln_pc = crit.p.ln();

        for i in order {
            let area = self.segments[i].area;
            let rel = (area - a_star) / a_star;
            let ln_p = if rel.abs() <= 1e-12 {
                ln_pc
            } else if rel < 0.0 {
                return Err(ChannelError::InvalidGeometry {
                    what: "station area below the throat area",
                });
            } else {
                let target = crit.mass_flow / area;
                let residual = |c: &Caloric, u: f64| u / c.v / target - 1.0;
                let supersonic = self.strategy == Strategy::Nozzle && i > i_throat;
                if supersonic {
                    self.isentrope_root(Bracket::Below(ln_pc), residual)?
                } else {
                    self.isentrope_root(Bracket::Between(ln_pc, ln_pt), residual)?
                }
            };
            self.store_station(i, ln_p)?;
        }
        Ok(())
    }

    /// Static states from a Mach-number distribution at fixed `s_t` and `h_t`.
    pub fn apply_moc(&mut self, moc: &MocProfile) -> ChannelResult<()> {
        let crit = self.ensure_critical()?;
        let ln_pt = self.total()?.p.ln();
        let ln_pc = crit.p.ln();
        let (start, end) = (self.geometry.start(), self.geometry.end());
        self.compositions = vec![Vec::new(); self.segments.len()];
        for i in 0..self.segments.len() {
            let ma = moc.project(self.segments[i].x, start, end);
            let residual = move |c: &Caloric, u: f64| u * u / (c.c * c.c) - ma * ma;
            let ln_p = if ma == 0.0 {
                ln_pt
            } else if ma == 1.0 {
                ln_pc
            } else if ma < 1.0 {
                self.isentrope_root(Bracket::Between(ln_pc, ln_pt), residual)?
            } else {
                self.isentrope_root(Bracket::Below(ln_pc), residual)?
            };
            self.store_station(i, ln_p)?;
        }
        Ok(())
    }

    fn store_station(&mut self, i: usize, ln_p: f64) -> ChannelResult<()> {
        let h_t = self.total()?.h;
        let c = self.on_isentrope(ln_p.exp())?;
        let u = Self::velocity(h_t, &c);
        let seg = &mut self.segments[i];
        let flow = FlowState::caloric(&self.work, c.t, c.p, u)?.with_geometry(seg.area, seg.d_h, seg.x);
        debug!(station = i, x = seg.x, t = flow.t, p = flow.p, ma = flow.ma, "isentropic station");
        seg.flow = Some(flow);
        self.compositions[i] = self.work.mass_fractions().to_vec();
        Ok(())
    }

    /// Property tables of every station at its own pressure and composition.
    pub fn build_tables(&mut self, mesh: &dyn MeshFields) -> ChannelResult<()> {
        let t_total = self.total()?.t;
        let points = self
            .config
            .spline_points
            .unwrap_or_else(|| PropertySplines::default_points(&self.work));
        let mut tables = Vec::with_capacity(self.segments.len());
        for (i, seg) in self.segments.iter().enumerate() {
            let flow = seg.flow()?;
            let t_wall = mesh.get(MeshField::WallTemperature, i)?;
            self.work.remix(&self.compositions[i])?;
            let lo = TABLE_LOWER_FACTOR * t_wall.min(flow.t);
            let hi = TABLE_UPPER_FACTOR * t_wall.max(t_total);
            tables.push(PropertySplines::build(&self.work, flow.p, lo, hi, points)?.matrices());
        }
        self.tables = tables;
        Ok(())
    }

    /// Boundary layer of every station from the cached tables.
    pub fn compute_walls(&mut self, mesh: &mut dyn MeshFields) -> ChannelResult<()> {
        let n = self.segments.len();
        if mesh.len() != n || self.tables.len() != n {
            return Err(ChannelError::InvalidArg {
                what: "mesh and tables must match the stations",
            });
        }
        let order: Vec<usize> = match self.config.direction {
            Direction::Forward => (0..n).collect(),
            Direction::Reverse => (0..n).rev().collect(),
        };
        for i in order {
            let flow = self.segments[i].flow()?.clone();
            let t_wall = mesh.get(MeshField::WallTemperature, i)?;
            self.bl.mixture_mut().remix(&self.compositions[i])?;
            self.bl.set_hydraulic_diameter(flow.d_h)?;
            self.bl.set_wall_temperature(t_wall);
            self.bl
                .set_flow_conditions_with_splines(flow.t, flow.p, flow.u, &self.tables[i])?;
            let mut params = Parameters::new(flow.x, flow.area);
            self.bl.compute(&mut params, false)?;
            let wall = params.wall();
            for (field, value) in [
                (MeshField::HeatFlux, wall.q_wall),
                (MeshField::RecoveryTemperature, wall.t_recovery),
                (MeshField::Alpha, wall.alpha),
                (MeshField::FluidTemperature, flow.t),
                (MeshField::FluidPressure, flow.p),
                (MeshField::FluidMach, flow.ma),
            ] {
                mesh.set(field, i, value)?;
            }
            self.segments[i].wall = wall;
        }
        Ok(())
    }

    /// Critical state, static states, tables and wall loads in sequence.
    pub fn run(&mut self, mesh: &mut dyn MeshFields) -> ChannelResult<()> {
        self.critical_state()?;
        self.solve_static()?;
        self.build_tables(mesh)?;
        self.compute_walls(mesh)
    }
}

#[derive(Debug, Clone, Copy)]
enum Bracket {
    Between(f64, f64),
    /// Below the given `ln p`, widened downwards until the sign changes
    Below(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AxisymmetricContour;
    use approx::assert_relative_eq;
    use qf_boundary::{ChannelKind, FrictionMethod, SigmaMode};
    use qf_fluids::{Composition, Species};

    fn air() -> Mixture {
        Mixture::ideal(
            Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap(),
        )
    }

    fn channel(points: &[(f64, f64)], strategy: Strategy, stations: usize) -> IsotropicChannel {
        let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        let geometry = AxisymmetricContour::new(points).unwrap();
        let mut ch = IsotropicChannel::new(
            Box::new(geometry),
            bl,
            strategy,
            IsotropicConfig {
                stations,
                ..IsotropicConfig::default()
            },
        )
        .unwrap();
        ch.set_total(1500.0, 10e5).unwrap();
        ch
    }

    #[test]
    fn critical_state_is_sonic() {
        let mut ch = channel(&[(0.0, 0.04), (0.1, 0.02)], Strategy::Chamber, 11);
        let crit = ch.critical_state().unwrap();
        let c = air().caloric(crit.t, crit.p).unwrap();
        assert_relative_eq!(crit.u, c.c, max_relative = 1e-8);
        // ideal-gas estimate p*/p_t ≈ 0.53 for γ ≈ 1.33
        assert!(crit.p > 0.5e6 && crit.p < 0.56e6, "p* = {}", crit.p);
        assert_relative_eq!(crit.area, std::f64::consts::PI * 4e-4, max_relative = 1e-12);
    }

    #[test]
    fn chamber_is_subsonic_and_accelerates() {
        let mut ch = channel(&[(0.0, 0.04), (0.1, 0.02)], Strategy::Chamber, 11);
        ch.solve_static().unwrap();
        let mdot = ch.critical().unwrap().mass_flow;
        let s_t = air().entropy(1500.0, 10e5).unwrap();
        let mut last_ma = 0.0;
        for seg in ch.segments() {
            let f = seg.flow().unwrap();
            assert!(f.ma > last_ma && f.ma <= 1.0 + 1e-6);
            last_ma = f.ma;
            assert_relative_eq!(f.mass_flow(), mdot, max_relative = 1e-6);
            assert_relative_eq!(f.s, s_t, max_relative = 1e-8);
        }
        assert_relative_eq!(last_ma, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn equilibrium_without_reactions_matches_frozen() {
        let mut frozen = channel(&[(0.0, 0.04), (0.1, 0.02)], Strategy::Chamber, 5);
        frozen.solve_static().unwrap();
        let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        let mut eq = IsotropicChannel::new(
            Box::new(AxisymmetricContour::new(&[(0.0, 0.04), (0.1, 0.02)]).unwrap()),
            bl,
            Strategy::Chamber,
            IsotropicConfig {
                stations: 5,
                equilibrium: true,
                ..IsotropicConfig::default()
            },
        )
        .unwrap();
        eq.set_total(1500.0, 10e5).unwrap();
        eq.solve_static().unwrap();
        for (a, b) in frozen.segments().iter().zip(eq.segments()) {
            assert_relative_eq!(a.flow().unwrap().p, b.flow().unwrap().p, max_relative = 1e-6);
        }
    }

    #[test]
    fn needs_total_state() {
        let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
            .unwrap();
        let mut ch = IsotropicChannel::new(
            Box::new(AxisymmetricContour::new(&[(0.0, 0.04), (0.1, 0.02)]).unwrap()),
            bl,
            Strategy::Nozzle,
            IsotropicConfig::default(),
        )
        .unwrap();
        assert!(ch.critical_state().is_err());
        assert_eq!("nozzle".parse::<Strategy>().unwrap(), Strategy::Nozzle);
    }
}
