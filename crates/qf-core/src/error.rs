use thiserror::Error;

pub type QfResult<T> = Result<T, QfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Length mismatch: {what} (expected {expected}, got {got})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
