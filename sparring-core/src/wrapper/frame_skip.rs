use super::VecObs;
use crate::{
    error::HarnessError, record::Record, Combatants, Env, FrameSource, Health, Step,
};
use anyhow::Result;
use image::RgbImage;

/// Repeats every action over `skip` steps of the wrapped environment.
///
/// The reward of a step is the sum of the rewards of the repeated steps, and the
/// observation is the element-wise maximum of the observations of the last two
/// of them. Repetition stops early when the episode ends. The record of a step
/// merges the records of the repeated steps, later values winning.
pub struct FrameSkip<E> {
    env: E,
    skip: usize,
}

impl<E> FrameSkip<E> {
    /// Steps an action is repeated for when built with [`Env::build`].
    pub const DEFAULT_SKIP: usize = 2;

    /// Wraps `env`, repeating actions `skip` times.
    pub fn new(env: E, skip: usize) -> Result<Self> {
        if skip == 0 {
            return Err(HarnessError::InvalidInterval("skip").into());
        }
        Ok(Self { env, skip })
    }

    /// Steps an action is repeated for.
    pub fn skip(&self) -> usize {
        self.skip
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

fn max_pool<O: VecObs>(a: &O, b: &O) -> O {
    let features = a
        .features()
        .iter()
        .zip(b.features())
        .map(|(x, y)| x.max(*y))
        .collect();
    O::from_features(features)
}

impl<E> Env for FrameSkip<E>
where
    E: Env,
    E::Obs: VecObs,
{
    type Config = E::Config;
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Self::new(E::build(config, seed)?, Self::DEFAULT_SKIP)
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let mut reward = 0.0;
        let mut record = Record::empty();
        let mut prev_obs = None;
        let mut i = 0;
        loop {
            let (step, r) = self.env.step(a);
            reward += step.reward;
            record = record.merge(r);
            i += 1;
            if i == self.skip || step.is_done() {
                let obs = match &prev_obs {
                    Some(prev) => max_pool(prev, &step.obs),
                    None => step.obs,
                };
                let step = Step::new(
                    obs,
                    step.act,
                    reward,
                    step.is_terminated,
                    step.is_truncated,
                    step.info,
                );
                return (step, record);
            }
            prev_obs = Some(step.obs);
        }
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.env.reset()
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.env.reset_with_index(ix)
    }
}

impl<E: Combatants> Combatants for FrameSkip<E> {
    fn read_health(&self) -> Health {
        self.env.read_health()
    }
}

impl<E: FrameSource> FrameSource for FrameSkip<E> {
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
    use crate::{dummy::ScriptedAct, wrapper::test_env::CounterEnv};

    #[test]
    fn rewards_are_summed_and_last_two_observations_pooled() -> Result<()> {
        let mut env = FrameSkip::new(CounterEnv::new(10), 2)?;
        env.reset()?;

        let (step, record) = env.step(&ScriptedAct(0));
        // Observations [1, 9] and [2, 8].
        assert_eq!(step.obs.0, vec![2.0, 9.0]);
        assert_eq!(step.reward, 3.0);
        assert!(!step.is_done());
        assert_eq!(record.get_scalar("t")?, 2.0);

        let (step, _) = env.step(&ScriptedAct(0));
        assert_eq!(step.obs.0, vec![4.0, 7.0]);
        assert_eq!(step.reward, 7.0);
        assert_eq!(env.inner().n_steps, 4);
        Ok(())
    }

    #[test]
    fn repetition_stops_at_episode_end() -> Result<()> {
        let mut env = FrameSkip::new(CounterEnv::new(3), 2)?;
        env.reset()?;
        env.step(&ScriptedAct(0));

        let (step, _) = env.step(&ScriptedAct(0));
        assert!(step.is_terminated);
        assert_eq!(step.obs.0, vec![3.0, 7.0]);
        assert_eq!(step.reward, 3.0);
        assert_eq!(env.inner().n_steps, 3);
        Ok(())
    }

    #[test]
    fn capabilities_reach_the_wrapped_env() -> Result<()> {
        let mut env = FrameSkip::<CounterEnv>::build(&10, 0)?;
        assert_eq!(env.skip(), FrameSkip::<CounterEnv>::DEFAULT_SKIP);
        env.reset()?;
        env.set_frame_retention(true);
        env.step(&ScriptedAct(0));

        assert!(env.is_retaining_frames());
        assert_eq!(env.read_health().opponent, 98.0);
        assert_eq!(env.take_frames().len(), 2);
        assert_eq!(env.frame_size(), (2, 2));
        Ok(())
    }

    #[test]
    fn zero_skip_is_rejected() {
        assert!(FrameSkip::new(CounterEnv::new(3), 0).is_err());
    }
}
