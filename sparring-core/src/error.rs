//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// An interval, a step cap or a frame count was configured as zero.
    #[error("{0} must be positive")]
    InvalidInterval(&'static str),

    /// The running history of a scheduler was flushed twice.
    #[error("Running history has already been flushed")]
    AlreadyFlushed,

    /// No frame was retained during a capture episode.
    #[error("No frame to encode into {0}")]
    EmptyVideo(String),

    /// A frame of a video does not have the declared size.
    #[error("Frame size mismatch: expected {expected:?}, got {got:?}")]
    FrameSizeMismatch {
        /// Declared frame size.
        expected: (u32, u32),
        /// Size of the offending frame.
        got: (u32, u32),
    },
}
