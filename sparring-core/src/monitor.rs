//! Episode statistics of a training environment.
use crate::{
    record::{Record, RecordValue},
    Combatants, Env, FrameSource, Health, Step,
};
use anyhow::Result;
use image::RgbImage;

/// Wraps an environment and keeps the cumulative reward and the length of every
/// finished episode.
///
/// An episode cut by [`Env::reset`] before its end is not kept.
pub struct Monitor<E> {
    env: E,
    reward: f32,
    length: usize,
    episode_rewards: Vec<f32>,
    episode_lengths: Vec<usize>,
}

impl<E> Monitor<E> {
    /// Wraps `env`.
    pub fn new(env: E) -> Self {
        Self {
            env,
            reward: 0.0,
            length: 0,
            episode_rewards: vec![],
            episode_lengths: vec![],
        }
    }

    /// Cumulative rewards of finished episodes.
    pub fn episode_rewards(&self) -> &[f32] {
        &self.episode_rewards
    }

    /// Lengths of finished episodes.
    pub fn episode_lengths(&self) -> &[usize] {
        &self.episode_lengths
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Unwraps the environment.
    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Env> Env for Monitor<E> {
    type Config = E::Config;
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self::new(E::build(config, seed)?))
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let (step, mut record) = self.env.step(a);
        self.reward += step.reward;
        self.length += 1;

        if step.is_done() {
            record.insert("episode_reward", RecordValue::Scalar(self.reward));
            record.insert("episode_length", RecordValue::Scalar(self.length as f32));
            self.episode_rewards.push(self.reward);
            self.episode_lengths.push(self.length);
            self.reward = 0.0;
            self.length = 0;
        }

        let step = Step::new(
            step.obs,
            step.act,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        (step, record)
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.reward = 0.0;
        self.length = 0;
        self.env.reset()
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.reward = 0.0;
        self.length = 0;
        self.env.reset_with_index(ix)
    }
}

impl<E: Combatants> Combatants for Monitor<E> {
    fn read_health(&self) -> Health {
        self.env.read_health()
    }
}

impl<E: FrameSource> FrameSource for Monitor<E> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{CountingListener, ScriptedAgent, ScriptedEnv, ScriptedEnvConfig},
        record::NullRecorder,
        Trainer, TrainerConfig,
    };

    #[test]
    fn finished_training_episodes_are_kept() -> Result<()> {
        let config = ScriptedEnvConfig::default()
            .episode_len(4)
            .reward_per_step(0.25);
        let mut env = Monitor::<ScriptedEnv>::build(&config, 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default();
        let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(10));

        trainer.train(&mut env, &mut agent, &mut listener, &mut NullRecorder::new())?;

        // The third episode is unfinished after 10 steps.
        assert_eq!(env.episode_lengths(), &[4, 4]);
        assert_eq!(env.episode_rewards(), &[1.0, 1.0]);
        assert_eq!(env.inner().n_resets(), 3);
        Ok(())
    }
}
