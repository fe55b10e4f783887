#![warn(missing_docs)]
//! Training loop, periodic evaluation and logging for reinforcement learning
//! experiments on duel games.
//!
//! The optimization algorithm and the game itself are provided through the
//! [`Agent`] and [`Env`] traits. [`Trainer`] runs the training loop and notifies a
//! [`TrainingListener`] at every environment step; [`EvalScheduler`] is the listener
//! that saves checkpoints, records videos and runs evaluation passes at fixed
//! intervals on its own evaluation environment. The [`wrapper`] module provides
//! the frame skipping and stacking applied to both environments.
pub mod dummy;
pub mod error;
pub mod evaluator;
pub mod log_sink;
pub mod record;
pub mod util;
pub mod video;
pub mod wrapper;
pub use wrapper::{FrameSkip, FrameStack, VecObs};

mod base;
pub use base::{Act, Agent, Combatants, Env, FrameSource, Health, Info, Obs, Policy, Step};

mod listener;
pub use listener::{NullListener, TrainingListener};

mod monitor;
pub use monitor::Monitor;

mod scheduler;
pub use scheduler::{EvalScheduler, SchedulerConfig};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};
