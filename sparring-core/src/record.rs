//! Types and traits for recording metrics during training and evaluation.
//!
//! * [`Record`] - key-value pairs of [`RecordValue`]s produced by environments,
//!   agents, the training loop and the evaluation scheduler
//! * [`Recorder`] - a destination of records
//! * [`LogRecorder`] - writes records through the `log` facade
//! * [`BufferedRecorder`] - keeps records in memory
//! * [`NullRecorder`] - discards records
//!
//! ```rust
//! use sparring_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("win_rate", 0.4);
//! record.insert("rewards", RecordValue::Array1(vec![1.0, -2.5]));
//! assert_eq!(record.get_scalar("win_rate").unwrap(), 0.4);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
