//! Reaction-scheme errors.

use qf_core::QfError;
use qf_fluids::FluidError;
use thiserror::Error;

pub type KineticsResult<T> = Result<T, KineticsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KineticsError {
    /// Malformed mechanism text.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Mechanism species missing from the mixture.
    #[error("Species {species} of the mechanism is not part of the mixture")]
    MissingSpecies { species: &'static str },

    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

impl From<QfError> for KineticsError {
    fn from(err: QfError) -> Self {
        KineticsError::Fluid(err.into())
    }
}
