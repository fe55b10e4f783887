//! Runs reinforcement learning experiments against every enemy of the duel game.
//!
//! An experiment trains one agent per enemy and per reward weighting, for as many
//! runs as requested. During training, an
//! [`EvalScheduler`](sparring_core::EvalScheduler) saves checkpoints, records videos
//! and evaluates the agent on an environment with unweighted rewards. Results are
//! laid out as
//!
//! ```text
//! <output_dir>/<algorithm>/run<r>/<EnemyName>/
//!     Evaluation_lengths.csv
//!     Evaluation_rewards.csv
//!     Training_lengths.csv
//!     Training_rewards.csv
//!     models/(<wp>, <we>)/<step>.model
//!     videos/(<wp>, <we>)/<step>.avi
//!     raw-data/(<wp>, <we>)/{wins,rewards}.csv
//! ```
//!
//! where `wp` and `we` are the weights of the damage taken by the player and
//! dealt to the enemy in the training reward.
//!
//! * [`ExperimentConfig`] - intervals, budgets and the grid of enemies and weights
//! * [`ExperimentGrid`] - the environment configurations derived from it
//! * [`RunLayout`] - paths of the output files of a run
//! * [`AgentBuilder`] - constructs the agent trained on each configuration
//! * [`Experiment`] - the loop over runs, enemies and weights
mod agent;
mod config;
mod enemy;
mod error;
mod experiment;
mod grid;
mod layout;
pub use agent::{
    AgentBuilder, EvalEnv, RandomAgent, RandomAgentBuilder, RandomAgentConfig, TrainEnv,
};
pub use config::ExperimentConfig;
pub use enemy::{enemy_name, ENEMY_NAMES};
pub use error::ExperimentError;
pub use experiment::Experiment;
pub use grid::{EnvVariant, ExperimentGrid};
pub use layout::{EnemyLogs, RunLayout};
