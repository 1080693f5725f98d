//! qf-fluids: thermochemical properties of gas mixtures for quasiflow.
//!
//! Provides:
//! - Species database (NASA 7-coefficient polynomials, transport and critical data)
//! - Composition handling (mass/mole fractions, element content)
//! - Equations of state: ideal gas, SRK cubic, Helmholtz (CoolProp via `rfluids`)
//!   spliced onto SRK above the Helmholtz validity range
//! - Chemical equilibrium by Gibbs minimisation
//! - Isentropic and total-condition inversions
//! - Natural cubic property splines along an isobar
//! - `FlowState`, the bulk state of a stream cross-section
//!
//! # Architecture
//!
//! `Mixture` binds a `Composition` to one backend implementing
//! `EquationOfState`. Everything downstream (wall functions, boundary layer,
//! channel marcher) talks to `Mixture` or to `PropertySplines` built from it.
//!
//! # Example
//!
//! ```
//! use qf_fluids::{Composition, Mixture, Species};
//!
//! let air = Mixture::ideal(
//!     Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap(),
//! );
//! let c = air.caloric(300.0, 101_325.0).unwrap();
//! println!("rho = {:.3} kg/m³, gamma = {:.3}", c.rho(), c.gamma());
//! ```

pub mod composition;
pub mod coolprop;
pub mod equilibrium;
pub mod error;
pub mod ideal;
pub mod isentropic;
pub mod mixture;
pub mod model;
pub mod nasa;
pub mod species;
pub mod splice;
pub mod splines;
pub mod srk;
pub mod state;
pub mod transport;

// Re-exports for ergonomics
pub use composition::Composition;
pub use coolprop::Helmholtz;
pub use error::{FluidError, FluidResult};
pub use ideal::IdealGas;
pub use mixture::Mixture;
pub use model::{Caloric, EosKind, EquationOfState, Properties, T_MAX, T_MIN, Transport};
pub use nasa::Nasa7;
pub use species::{Element, Species, fix_label};
pub use splice::HelmholtzSplice;
pub use splines::{CubicSpline, PropertySplines, SplineMatrices};
pub use srk::Srk;
pub use state::FlowState;
