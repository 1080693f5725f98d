//! Fluid property errors.

use qf_core::QfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value outside the tabulated or fitted range.
    #[error("Value out of range for {what}: {value} not in [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Mixture definition incompatible with the requested equation of state.
    #[error("Invalid mixture: {what}")]
    InvalidMixture { what: &'static str },

    /// Operation not supported (e.g., unsupported species or oxidizer).
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Iterative inversion exhausted its iteration cap.
    #[error("Too many iterations in {what} ({iterations}); last state: {state}")]
    TooManyIterations {
        what: &'static str,
        iterations: usize,
        state: String,
    },
}

impl From<QfError> for FluidError {
    fn from(err: QfError) -> Self {
        match err {
            QfError::NonFinite { what, .. } => FluidError::NonPhysical { what },
            QfError::InvalidArg { what } => FluidError::InvalidArg { what },
            QfError::LengthMismatch { what, .. } => FluidError::InvalidArg { what },
            QfError::Invariant { what } => FluidError::NonPhysical { what },
        }
    }
}
