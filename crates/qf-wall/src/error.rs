//! Error types for wall-function evaluations.

use qf_core::error::QfError;
use qf_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur in wall-function primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WallError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Too many iterations in {what} ({iterations}); last state: {state}")]
    TooManyIterations {
        what: &'static str,
        iterations: usize,
        state: String,
    },

    #[error(transparent)]
    Fluid(#[from] FluidError),
}

pub type WallResult<T> = Result<T, WallError>;

impl From<QfError> for WallError {
    fn from(e: QfError) -> Self {
        match e {
            QfError::NonFinite { what, .. } => WallError::NonPhysical { what },
            QfError::InvalidArg { what } => WallError::InvalidArg { what },
            QfError::LengthMismatch { what, .. } => WallError::InvalidArg { what },
            QfError::Invariant { what } => WallError::NonPhysical { what },
        }
    }
}
