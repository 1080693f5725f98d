//! Quasi-one-dimensional compressible channel flow.
//!
//! Provides:
//! - Channel geometries (cylindrical duct, rectangular channel, axisymmetric contour)
//! - The real-gas channel ODE in `(ln v, ln u, ln T)` with friction, heat and
//!   composition sources
//! - An adaptive Dormand–Prince integrator
//! - The element marcher, coupling each three-node element to the boundary layer
//!   until wall loads and states settle
//! - The isentropic channel solver for chambers and nozzles, with optional
//!   Mach-number profiles from a method-of-characteristics run
//! - Node-field storage shared with a wall mesh
//!
//! # Example
//!
//! ```no_run
//! use qf_boundary::{BoundaryLayer, ChannelKind, FrictionMethod, SigmaMode};
//! use qf_channel::{CylindricalDuct, Inflow, Marcher, MarcherConfig};
//! use qf_fluids::{Composition, Mixture, Species};
//!
//! let air = Mixture::ideal(
//!     Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap(),
//! );
//! let bl = BoundaryLayer::new(air, ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
//!     .unwrap();
//! let duct = CylindricalDuct::new(0.01, 0.5).unwrap();
//! let mut marcher = Marcher::new(Box::new(duct), bl, MarcherConfig::default()).unwrap();
//! let mut mesh = marcher.mesh(500.0);
//! let summary = marcher
//!     .march(&mut mesh, Inflow { t: 300.0, p: 2e5, u: 30.0 })
//!     .unwrap();
//! println!("outlet T = {} K", summary.outlet.t);
//! ```

pub mod element;
pub mod error;
pub mod geometry;
pub mod integrator;
pub mod isotropic;
pub mod marcher;
pub mod mesh;
pub mod moc;
pub mod ode;

pub use element::{Element, Segment};
pub use error::{ChannelError, ChannelResult};
pub use geometry::{AxisymmetricContour, CylindricalDuct, Geometry, RectangularChannel, stations};
pub use integrator::{OdeSystem, Rk45, Rk45Config, Rk45Report, State};
pub use isotropic::{CriticalState, IsotropicChannel, IsotropicConfig, Strategy};
pub use marcher::{Inflow, MarchSummary, Marcher, MarcherConfig, march_closed_form};
pub use mesh::{MeshField, MeshFields, NodeFields};
pub use moc::MocProfile;
pub use ode::{ChannelOde, CompositionChange, Direction, Friction, Section, Source, WallLoad};
