use super::VecObs;
use crate::{
    error::HarnessError, record::Record, Combatants, Env, FrameSource, Health, Step,
};
use anyhow::Result;
use image::RgbImage;

/// Concatenates the latest `n_stack` observations, oldest first.
///
/// After a reset, the slots of the missing older observations are filled with
/// zeros.
pub struct FrameStack<E> {
    env: E,
    n_stack: usize,
    stacked: Vec<f32>,
}

impl<E> FrameStack<E> {
    /// Observations stacked when built with [`Env::build`].
    pub const DEFAULT_N_STACK: usize = 3;

    /// Wraps `env`, stacking `n_stack` observations.
    pub fn new(env: E, n_stack: usize) -> Result<Self> {
        if n_stack == 0 {
            return Err(HarnessError::InvalidInterval("n_stack").into());
        }
        Ok(Self {
            env,
            n_stack,
            stacked: vec![],
        })
    }

    /// Observations stacked.
    pub fn n_stack(&self) -> usize {
        self.n_stack
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Unwraps the environment.
    pub fn into_inner(self) -> E {
        self.env
    }

    fn restart(&mut self, features: &[f32]) {
        self.stacked = vec![0.0; features.len() * (self.n_stack - 1)];
        self.stacked.extend_from_slice(features);
    }

    fn push(&mut self, features: &[f32]) {
        if self.stacked.len() != features.len() * self.n_stack {
            self.restart(features);
        } else {
            self.stacked.drain(..features.len());
            self.stacked.extend_from_slice(features);
        }
    }
}

impl<E> Env for FrameStack<E>
where
    E: Env,
    E::Obs: VecObs,
{
    type Config = E::Config;
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Self::new(E::build(config, seed)?, Self::DEFAULT_N_STACK)
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let (step, record) = self.env.step(a);
        self.push(step.obs.features());
        let step = Step::new(
            <E::Obs as VecObs>::from_features(self.stacked.clone()),
            step.act,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        (step, record)
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let obs = self.env.reset()?;
        self.restart(obs.features());
        Ok(<E::Obs as VecObs>::from_features(self.stacked.clone()))
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        let obs = self.env.reset_with_index(ix)?;
        self.restart(obs.features());
        Ok(<E::Obs as VecObs>::from_features(self.stacked.clone()))
    }
}

impl<E: Combatants> Combatants for FrameStack<E> {
    fn read_health(&self) -> Health {
        self.env.read_health()
    }
}

impl<E: FrameSource> FrameSource for FrameStack<E> {
    fn set_frame_retention(&mut self, keep: bool) {
        self.env.set_frame_retention(keep)
    }

    fn is_retaining_frames(&self) -> bool {
        self.env.is_retaining_frames()
    }

    fn take_frames(&mut self) -> Vec<RgbImage> {
        self.env.take_frames()
    }

    fn frame_size(&self) -> (u32, u32) {
        self.env.frame_size()
    }
}
