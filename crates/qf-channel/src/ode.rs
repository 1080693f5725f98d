//! Quasi-1D channel ODE in `(v, u, T)`.
//!
//! Mass, momentum and energy along the axis give the linear system
//!
//! ```text
//! J · d(ln v, ln u, ln T)/dx = b
//! ```
//!
//! with the real-gas matrix
//!
//! ```text
//! ⎡ 1           −1         0             ⎤
//! ⎢ −1/(pκ)     u²/(pv)    βT            ⎥
//! ⎣ (αT−1)v/κ   u²         (c_v + pvβ)T  ⎦
//! ```
//!
//! (the ideal-gas form has `−1, 1, 0, c_p T` in place of the EoS terms) and
//! `b = (A'/A, −4τ_w/(D_h p) − R'/R, −4Aq̇_w/(D_h ṁ) − w')`.

use crate::element::Element;
use crate::error::{ChannelError, ChannelResult};
use crate::geometry::Geometry;
use crate::integrator::{OdeSystem, State};
use nalgebra::Matrix3;
use qf_fluids::{Caloric, Mixture};
use qf_wall::{cf_moody, turbulent_recovery_factor};

/// Dittus–Boelter Nusselt correlation `Nu = 0.023 Re^0.8 Pr^0.4`.
const DB_COEFF: f64 = 0.023;
const DB_RE_EXP: f64 = 0.8;
const DB_PR_EXP: f64 = 0.4;

/// Marching direction relative to `+x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    /// Flow towards `−x`, e.g. a coolant channel fed at the nozzle end.
    Reverse,
}

impl Direction {
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Where cross-section data come from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Geometry(&'a dyn Geometry),
    /// Shape-function interpolation over a three-node element
    Element(&'a Element),
}

/// Where wall shear and heat flux come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Friction {
    /// Closed form: Moody friction and Dittus–Boelter heat transfer.
    DittusBoelter { t_wall: f64, roughness: f64 },
    /// Boundary-layer values stored on the element segments.
    Element,
}

/// Composition drift of a reacting stream, per unit `x`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositionChange {
    /// `d ln R / dx`
    pub dlnr_dx: f64,
    /// Enthalpy change at fixed `(T, p)`, `dw/dx`
    pub dh_dx: f64,
}

impl CompositionChange {
    /// Drift between two compositions of the same species list over `dx`.
    pub fn between(before: &Mixture, after: &Mixture, t: f64, p: f64, dx: f64) -> ChannelResult<Self> {
        if dx == 0.0 || !dx.is_finite() {
            return Err(ChannelError::InvalidArg {
                what: "composition change needs a non-zero length",
            });
        }
        Ok(Self {
            dlnr_dx: (after.gas_constant() / before.gas_constant()).ln() / dx,
            dh_dx: (after.enthalpy(t, p)? - before.enthalpy(t, p)?) / dx,
        })
    }
}

/// Cross-section data at one `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    pub area: f64,
    pub d_h: f64,
    pub darea_dx: f64,
}

/// Wall data at one `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLoad {
    pub tau_wall: f64,
    /// Positive into the wall
    pub q_wall: f64,
}

/// Right-hand side of the channel ODE.
#[derive(Debug, Clone)]
pub struct ChannelOde<'a> {
    gas: &'a Mixture,
    source: Source<'a>,
    friction: Friction,
    mass_flow: f64,
    direction: Direction,
    composition: Option<CompositionChange>,
}

impl<'a> ChannelOde<'a> {
    pub fn new(gas: &'a Mixture, source: Source<'a>, friction: Friction, mass_flow: f64) -> ChannelResult<Self> {
        if !(mass_flow > 0.0 && mass_flow.is_finite()) {
            return Err(ChannelError::InvalidArg {
                what: "mass flow must be positive",
            });
        }
        if matches!((source, friction), (Source::Geometry(_), Friction::Element)) {
            return Err(ChannelError::InvalidArg {
                what: "element friction needs an element source",
            });
        }
        Ok(Self {
            gas,
            source,
            friction,
            mass_flow,
            direction: Direction::Forward,
            composition: None,
        })
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn set_composition_change(&mut self, change: CompositionChange) {
        self.composition = Some(change);
    }

    pub fn clear_composition_change(&mut self) {
        self.composition = None;
    }

    pub fn mass_flow(&self) -> f64 {
        self.mass_flow
    }

    pub fn section(&self, x: f64) -> Section {
        match self.source {
            Source::Geometry(g) => Section {
                area: g.area(x),
                d_h: g.hydraulic_diameter(x),
                darea_dx: g.darea_dx(x),
            },
            Source::Element(e) => Section {
                area: e.interpolate(x, |s| s.area),
                d_h: e.interpolate(x, |s| s.d_h),
                darea_dx: e.gradient(x, |s| s.area),
            },
        }
    }

    /// Wall shear and heat flux at `x` for the bulk state `c` moving at `u`.
    pub fn wall_load(&self, x: f64, c: &Caloric, u: f64, section: &Section) -> ChannelResult<WallLoad> {
        match (self.friction, self.source) {
            (Friction::Element, Source::Element(e)) => Ok(WallLoad {
                tau_wall: e.interpolate(x, |s| s.wall.tau_wall),
                q_wall: e.interpolate(x, |s| s.wall.q_wall),
            }),
            (Friction::Element, Source::Geometry(_)) => Err(ChannelError::InvalidArg {
                what: "element friction needs an element source",
            }),
            (Friction::DittusBoelter { t_wall, roughness }, _) => {
                let tr = self.gas.transport(c.t, c.p)?;
                let re = c.rho() * u.abs() * section.d_h / tr.mu;
                let pr = tr.prandtl(c.cp);
                let c_f = cf_moody(re, section.d_h, roughness)?;
                let alpha = DB_COEFF * re.powf(DB_RE_EXP) * pr.powf(DB_PR_EXP) * tr.lambda / section.d_h;
                let t_r = c.t + turbulent_recovery_factor(pr) * u * u / (2.0 * c.cp);
                Ok(WallLoad {
                    tau_wall: 0.5 * c_f * c.rho() * u * u,
                    q_wall: alpha * (t_r - t_wall),
                })
            }
        }
    }

    /// Coefficient matrix `J` for the state `c` moving at `u`.
    pub fn jacobian(&self, c: &Caloric, u: f64) -> Matrix3<f64> {
        let u2 = u * u;
        if self.gas.eos().is_ideal() {
            Matrix3::new(
                1.0, -1.0, 0.0, //
                -1.0, u2 / (c.p * c.v), 1.0, //
                0.0, u2, c.cp * c.t,
            )
        } else {
            let beta = c.beta();
            Matrix3::new(
                1.0, -1.0, 0.0, //
                -1.0 / (c.p * c.kappa), u2 / (c.p * c.v), beta * c.t, //
                (c.alpha * c.t - 1.0) * c.v / c.kappa, u2, (c.cv + c.p * c.v * beta) * c.t,
            )
        }
    }

    /// Source vector `b` at `x`.
    pub fn sources(&self, x: f64, c: &Caloric, u: f64) -> ChannelResult<State> {
        let sec = self.section(x);
        let wall = self.wall_load(x, c, u, &sec)?;
        let sign = self.direction.sign();
        let drift = self.composition.unwrap_or_default();
        Ok(State::new(
            sec.darea_dx / sec.area,
            -sign * 4.0 * wall.tau_wall / (sec.d_h * c.p) - drift.dlnr_dx,
            -sign * 4.0 * sec.area * wall.q_wall / (sec.d_h * self.mass_flow) - drift.dh_dx,
        ))
    }

    /// Bulk properties of `y = (v, u, T)`.
    pub fn caloric(&self, y: &State) -> ChannelResult<Caloric> {
        let (v, t) = (y[0], y[2]);
        if !(v > 0.0 && t > 0.0 && y[1] > 0.0) {
            return Err(ChannelError::NonPhysical {
                what: "channel state must be positive",
            });
        }
        let p = self.gas.pressure(v, t)?;
        Ok(self.gas.caloric(t, p)?)
    }

    /// `d(ln v, ln u, ln T)/dx` at `y = (v, u, T)`.
    pub fn log_derivative(&self, x: f64, y: &State) -> ChannelResult<State> {
        let c = self.caloric(y)?;
        let b = self.sources(x, &c, y[1])?;
        self.jacobian(&c, y[1]).lu().solve(&b).ok_or(ChannelError::NonPhysical {
            what: "singular channel Jacobian (sonic state)",
        })
    }

    /// `d(v, u, T)/dx`.
    pub fn derivative(&self, x: f64, y: &State) -> ChannelResult<State> {
        Ok(self.log_derivative(x, y)?.component_mul(y))
    }
}

/// Integrates `z = ln(v, u, T)`.
impl OdeSystem for ChannelOde<'_> {
    fn rhs(&mut self, x: f64, z: &State) -> ChannelResult<State> {
        self.log_derivative(x, &z.map(f64::exp))
    }
}
