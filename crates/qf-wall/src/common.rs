//! Common checks for wall-function inputs.

use crate::error::{WallError, WallResult};
use qf_core::numeric::{ensure_finite, ensure_positive};

/// Ensure a value is finite, returning `WallError::NonPhysical` if not.
pub fn check_finite(value: f64, what: &'static str) -> WallResult<f64> {
    ensure_finite(value, what).map_err(|_| WallError::NonPhysical { what })
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> WallResult<f64> {
    Ok(ensure_positive(value, what)?)
}
