//! Policy.
use super::Env;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy<E: Env> {
    /// Returns an action given an observation.
    ///
    /// With `deterministic = false` the action is sampled from the policy distribution.
    fn predict(&mut self, obs: &E::Obs, deterministic: bool) -> E::Act;

    /// Sample an action given an observation.
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        self.predict(obs, false)
    }
}
