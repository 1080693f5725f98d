//! Compressible turbulent boundary layer of an internal channel.
//!
//! Given the bulk state of a cross-section `(T̄, p, ū)`, the hydraulic
//! diameter, the wall temperature and roughness, the solver returns wall
//! shear stress, wall heat flux, recovery enthalpy and the linearized
//! heat-transfer coefficient `α = q̇_w/(T_r − T_w)`.
//!
//! The Messe method reconstructs the half-channel profile under
//! Crocco–Busemann coupling and solves for the centre state `(T̂, û)` whose
//! profile carries the bulk mass and momentum flux. The other methods are
//! closed-form correlations.
//!
//! # Example
//!
//! ```no_run
//! use qf_boundary::{BoundaryLayer, ChannelKind, FrictionMethod, Parameters, SigmaMode, Slot};
//! use qf_fluids::{Composition, Mixture, Species};
//!
//! let air = Mixture::ideal(
//!     Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap(),
//! );
//! let mut bl = BoundaryLayer::new(air, ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
//!     .unwrap();
//! bl.set_hydraulic_diameter(0.01).unwrap();
//! bl.set_wall_temperature(350.0);
//! bl.set_flow_conditions(300.0, 1e5, 30.0, false).unwrap();
//! let mut params = Parameters::new(0.0, 7.85e-5);
//! bl.compute(&mut params, false).unwrap();
//! println!("tau_w = {} Pa", params.get(Slot::TauWall));
//! ```

pub mod correlations;
pub mod crocco;
pub mod error;
pub mod grid;
pub mod jacobian;
pub mod methods;
pub mod newton;
pub mod parameters;
pub mod profile;
pub mod quadrature;
pub mod sigma;
pub mod solver;

pub use correlations::{WallFlux, WallInputs};
pub use crocco::CroccoBusemann;
pub use error::{BoundaryError, BoundaryResult};
pub use grid::{ChannelKind, Grid};
pub use methods::{FrictionMethod, PureMethane, SigmaMode};
pub use newton::OuterNewtonConfig;
pub use parameters::{Parameters, SECOND_WALL_LEN, SINGLE_WALL_LEN, Slot, WallState};
pub use profile::Profile;
pub use sigma::SigmaRecovery;
pub use solver::{BoundaryLayer, BoundaryLayerConfig};
