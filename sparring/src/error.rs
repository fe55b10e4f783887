//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum ExperimentError {
    /// The enemy id is not in `1..=8`.
    #[error("Unknown enemy id: {0}")]
    UnknownEnemy(u8),

    /// A reward weight is not in `[0, 1]`.
    #[error("Reward weight must be in [0, 1], got {0}")]
    InvalidWeight(f64),
}
