//! A duel between a player and one of eight enemies in a one-dimensional arena.
//!
//! The player moves left or right, jumps over enemy shots and shoots the enemy
//! when close enough. Enemies differ in speed, damage, range and fire rate.
//! The reward of a step weighs the damage dealt to the enemy against the damage
//! taken by the player, so that one game can be turned into several training
//! tasks by changing the weights.
//!
//! ```no_run
//! use anyhow::Result;
//! use sparring_core::{Env as _, FrameSource as _};
//! use sparring_duel_env::{DuelAct, DuelEnv, DuelEnvConfig};
//!
//! fn main() -> Result<()> {
//!     let config = DuelEnvConfig::default()
//!         .enemy(2)
//!         .weights(0.1, 0.9);
//!     let mut env = DuelEnv::build(&config, 42)?;
//!     env.set_frame_retention(true);
//!     env.reset()?;
//!     let (step, _) = env.step(&DuelAct::Shoot);
//!     println!("reward = {}, frames = {}", step.reward, env.take_frames().len());
//!     Ok(())
//! }
//! ```
mod act;
mod env;
mod obs;
pub use act::DuelAct;
pub use env::{DuelEnv, DuelEnvConfig, EnemyProfile, HEIGHT, MAX_LIFE, WIDTH};
pub use obs::DuelObs;
