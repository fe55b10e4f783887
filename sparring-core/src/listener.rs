//! Listener of the training loop.
use crate::{Agent, Env};
use anyhow::Result;

/// Receives lifecycle events of [`Trainer::train`](crate::Trainer::train).
///
/// Both methods are invoked synchronously from the training loop, so any work
/// done here stalls training until it returns.
pub trait TrainingListener<E: Env, A: Agent<E>> {
    /// Called once per environment step with the number of steps done so far,
    /// starting from 1.
    ///
    /// Returning `false` stops training.
    fn on_step(&mut self, env_steps: usize, agent: &mut A) -> Result<bool>;

    /// Called once after the last step.
    fn on_training_end(&mut self, agent: &mut A) -> Result<()>;
}

/// A listener doing nothing.
pub struct NullListener;

impl<E: Env, A: Agent<E>> TrainingListener<E, A> for NullListener {
    fn on_step(&mut self, _env_steps: usize, _agent: &mut A) -> Result<bool> {
        Ok(true)
    }

    fn on_training_end(&mut self, _agent: &mut A) -> Result<()> {
        Ok(())
    }
}
