//! Observation wrappers applied to training and evaluation environments.
//!
//! [`FrameSkip`] repeats an action over several environment steps and
//! [`FrameStack`] concatenates the latest observations. Both act on observations
//! that are flat feature vectors ([`VecObs`]) and forward [`Combatants`] and
//! [`FrameSource`] to the wrapped environment, so they can sit between an
//! [`EvalScheduler`](crate::EvalScheduler) and its environment.
//!
//! [`Combatants`]: crate::Combatants
//! [`FrameSource`]: crate::FrameSource
mod frame_skip;
mod frame_stack;
pub use frame_skip::FrameSkip;
pub use frame_stack::FrameStack;

use crate::Obs;

/// An observation made of a flat vector of features.
pub trait VecObs: Obs {
    /// The features.
    fn features(&self) -> &[f32];

    /// Builds an observation from features.
    fn from_features(features: Vec<f32>) -> Self;
}

#[cfg(test)]
pub(crate) mod test_env {
    use super::VecObs;
    use crate::{
        record::{Record, RecordValue},
        Combatants, Env, FrameSource, Health, Obs, Step,
    };
    use anyhow::Result;
    use image::RgbImage;

    #[derive(Clone, Debug, PartialEq)]
    pub struct CounterObs(pub Vec<f32>);

    impl Obs for CounterObs {}

    impl VecObs for CounterObs {
        fn features(&self) -> &[f32] {
            &self.0
        }

        fn from_features(features: Vec<f32>) -> Self {
            Self(features)
        }
    }

    /// Observes `[t, 10 - t]` after `t` steps and rewards `t` at step `t`.
    /// Terminates after `episode_len` steps.
    pub struct CounterEnv {
        pub episode_len: usize,
        pub t: usize,
        pub n_steps: usize,
        pub retaining: bool,
    }

    impl CounterEnv {
        pub fn new(episode_len: usize) -> Self {
            Self {
                episode_len,
                t: 0,
                n_steps: 0,
                retaining: false,
            }
        }

        fn observe(&self) -> CounterObs {
            CounterObs(vec![self.t as f32, 10.0 - self.t as f32])
        }
    }

    impl Env for CounterEnv {
        type Config = usize;
        type Obs = CounterObs;
        type Act = crate::dummy::ScriptedAct;
        type Info = ();

        fn build(config: &usize, _seed: i64) -> Result<Self> {
            Ok(Self::new(*config))
        }

        fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
            self.t += 1;
            self.n_steps += 1;
            let step = Step::new(
                self.observe(),
                a.clone(),
                self.t as f32,
                self.t >= self.episode_len,
                false,
                (),
            );
            let record = Record::from_slice(&[("t", RecordValue::Scalar(self.t as f32))]);
            (step, record)
        }

        fn reset(&mut self) -> Result<CounterObs> {
            self.t = 0;
            Ok(self.observe())
        }
    }

    impl Combatants for CounterEnv {
        fn read_health(&self) -> Health {
            Health {
                agent: 100.0,
                opponent: 100.0 - self.t as f32,
            }
        }
    }

    impl FrameSource for CounterEnv {
        fn set_frame_retention(&mut self, keep: bool) {
            self.retaining = keep;
        }

        fn is_retaining_frames(&self) -> bool {
            self.retaining
        }

        fn take_frames(&mut self) -> Vec<RgbImage> {
            vec![RgbImage::new(2, 2); self.n_steps]
        }

        fn frame_size(&self) -> (u32, u32) {
            (2, 2)
        }
    }
}
