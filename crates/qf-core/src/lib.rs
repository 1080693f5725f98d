//! qf-core: stable foundation for quasiflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - constants (immutable physical and wall-law constants)
//! - error (shared error types)

pub mod constants;
pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{QfError, QfResult};
pub use numeric::*;
pub use units::*;
