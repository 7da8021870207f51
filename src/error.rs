//! Error types for region assignment, PCA and export.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReefError>;

#[derive(Error, Debug)]
pub enum ReefError {
    /// Malformed or empty input tables, matrices, orders or configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Numerically degenerate input, such as a zero-variance column.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// The radius-doubling loop hit its iteration cap before covering every cell.
    #[error(
        "Region assignment did not converge after {passes} passes: {assigned} of {total} cells assigned"
    )]
    Convergence {
        passes: usize,
        assigned: usize,
        total: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid snapshot format")]
    InvalidFormat,
}

impl From<serde_json::Error> for ReefError {
    fn from(err: serde_json::Error) -> Self {
        ReefError::Serialization(err.to_string())
    }
}

#[cfg(feature = "snapshot")]
impl From<bincode::Error> for ReefError {
    fn from(err: bincode::Error) -> Self {
        ReefError::Serialization(err.to_string())
    }
}
