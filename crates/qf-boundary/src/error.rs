//! Error types for boundary-layer operations.

use qf_core::error::QfError;
use qf_fluids::FluidError;
use qf_wall::WallError;
use thiserror::Error;

/// Errors that can occur while solving the wall boundary layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid geometry: {what}")]
    InvalidGeometry { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error(
        "Crocco-Busemann transform failed (D_h={d_h} m, T_c={t_center} K, p={p} Pa, \
         u_c={u_center} m/s, T_w={t_wall} K)"
    )]
    CorrelationFail {
        d_h: f64,
        t_center: f64,
        p: f64,
        u_center: f64,
        t_wall: f64,
    },

    #[error("Too many iterations in {what} ({iterations}); last state: {state}")]
    TooManyIterations {
        what: &'static str,
        iterations: usize,
        state: String,
    },

    #[error("Wall function error: {0}")]
    Wall(#[from] WallError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type BoundaryResult<T> = Result<T, BoundaryError>;

impl From<QfError> for BoundaryError {
    fn from(e: QfError) -> Self {
        match e {
            QfError::NonFinite { what, .. } => BoundaryError::InvalidArg { what },
            QfError::InvalidArg { what } => BoundaryError::InvalidArg { what },
            QfError::LengthMismatch { what, .. } => BoundaryError::InvalidArg { what },
            QfError::Invariant { what } => BoundaryError::InvalidArg { what },
        }
    }
}
