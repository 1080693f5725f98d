//! qf-wall: wall-function primitives for quasiflow.
//!
//! Stateless functions used by the boundary-layer solver:
//! - Spalding's law of the wall and its inverse
//! - Coles wake correction
//! - Kays–Crawford turbulent Prandtl number
//! - Colebrook–White (Moody) friction coefficient
//! - Eckert reference temperature
//!
//! # Example
//!
//! ```
//! use qf_core::constants::{B_PLUS_SMOOTH, KARMAN};
//! use qf_wall::{spalding, spalding_e, spalding_y};
//!
//! let e = spalding_e(B_PLUS_SMOOTH, KARMAN);
//! let f = spalding(B_PLUS_SMOOTH, KARMAN, e, 30.0, None).unwrap();
//! assert!((spalding_y(B_PLUS_SMOOTH, KARMAN, e, f) - 30.0).abs() < 1e-9);
//! ```

pub mod common;
pub mod error;
pub mod friction;
pub mod prandtl;
pub mod reference;
pub mod spalding;
pub mod wake;

// Re-exports
pub use error::{WallError, WallResult};
pub use friction::cf_moody;
pub use prandtl::{kays_crawford, kays_crawford_default};
pub use reference::{reference_temperature, turbulent_recovery_factor};
pub use spalding::{spalding, spalding_dydf, spalding_e, spalding_y};
pub use wake::{dg_plus, g_plus};
