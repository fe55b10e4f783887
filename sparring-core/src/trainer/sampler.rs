//! Experience sampling in the training environment.
use crate::{record::Record, Agent, Env};
use anyhow::Result;
use std::time::SystemTime;

/// Manages the interaction of an agent with the training environment.
///
/// The sampler keeps the previous observation, resets the environment when an
/// episode ends and counts environment steps per second.
pub struct Sampler<'a, E: Env> {
    /// The environment being sampled from.
    env: &'a mut E,

    /// Previous observation from the environment.
    prev_obs: Option<E::Obs>,

    /// Environment steps since the last call of [`Sampler::reset_fps_counter`].
    n_env_steps_for_fps: usize,

    /// Time spent in sampling since the last reset of the counter.
    time: f32,
}

impl<'a, E: Env> Sampler<'a, E> {
    /// Creates a new sampler on the given environment.
    pub fn new(env: &'a mut E) -> Self {
        Self {
            env,
            prev_obs: None,
            n_env_steps_for_fps: 0,
            time: 0.0,
        }
    }

    /// Samples an action, applies it to the environment and hands the resulting
    /// step to the agent.
    ///
    /// The environment is reset before the first step and after every episode end.
    pub fn sample_and_observe<A: Agent<E>>(&mut self, agent: &mut A) -> Result<Record> {
        let now = SystemTime::now();

        let prev_obs = match self.prev_obs.take() {
            Some(obs) => obs,
            None => self.env.reset()?,
        };

        let act = agent.sample(&prev_obs);
        let (step, record) = self.env.step(&act);
        agent.observe(&step);

        self.prev_obs = match step.is_done() {
            true => None,
            false => Some(step.obs),
        };

        self.time += now.elapsed()?.as_millis() as f32;
        self.n_env_steps_for_fps += 1;

        Ok(record)
    }

    /// Returns frames (environment steps) per second since the last reset of the counter.
    pub fn fps(&self) -> f32 {
        if self.time == 0.0 {
            0.0
        } else {
            self.n_env_steps_for_fps as f32 / self.time * 1000.0
        }
    }

    /// Resets the counter of environment steps per second.
    pub fn reset_fps_counter(&mut self) {
        self.n_env_steps_for_fps = 0;
        self.time = 0.0;
    }
}
