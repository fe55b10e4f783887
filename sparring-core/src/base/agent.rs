//! Agent.
use super::{Env, Policy, Step};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// The optimization algorithm lives behind this trait; the training loop only
/// feeds it with environment steps and asks it to update its parameters.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Receives a step taken in the training environment.
    fn observe(&mut self, step: &Step<E>);

    /// Performs an optimization step.
    fn opt(&mut self) {
        let _ = self.opt_with_record();
    }

    /// Performs an optimization step and returns some information.
    fn opt_with_record(&mut self) -> Record;

    /// Save the parameters of the agent to the given path.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given path.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
