//! Error types for channel marching.

use qf_boundary::BoundaryError;
use qf_core::error::QfError;
use qf_fluids::FluidError;
use qf_wall::WallError;
use thiserror::Error;

/// Errors encountered while marching a channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid geometry: {what}")]
    InvalidGeometry { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Too many iterations in {what} ({iterations}); last state: {state}")]
    TooManyIterations {
        what: &'static str,
        iterations: usize,
        state: String,
    },

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Boundary layer: {0}")]
    Boundary(#[from] BoundaryError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Wall function error: {0}")]
    Wall(#[from] WallError),
}

pub type ChannelResult<T> = Result<T, ChannelError>;

impl From<QfError> for ChannelError {
    fn from(e: QfError) -> Self {
        match e {
            QfError::NonFinite { what, .. } => ChannelError::NonPhysical { what },
            QfError::InvalidArg { what } => ChannelError::InvalidArg { what },
            QfError::LengthMismatch { what, .. } => ChannelError::InvalidArg { what },
            QfError::Invariant { what } => ChannelError::NonPhysical { what },
        }
    }
}
