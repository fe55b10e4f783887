//! Train [`Agent`].
mod config;
mod sampler;
use crate::{
    error::HarnessError,
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, TrainingListener,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
pub use sampler::Sampler;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages training loop and notifies a [`TrainingListener`] at every step.
///
/// # Training loop
///
/// 0. Given an agent implementing [`Agent`], a listener implementing
///    [`TrainingListener`] and a recorder implementing [`Recorder`].
/// 1. Reset a counter of the environment steps `env_steps = 0` and a counter of
///    the optimization steps `opt_steps = 0`.
/// 2. Do an environment step with [`Sampler`]; the step is handed to
///    [`Agent::observe`]. The environment is reset when an episode ends.
/// 3. `env_steps += 1`
/// 4. If `env_steps >= warmup_period` and `env_steps % opt_interval == 0`, do an
///    optimization step and `opt_steps += 1`.
/// 5. If `env_steps % record_compute_cost_interval == 0`, record environment steps
///    per second as `"fps"`.
/// 6. Call [`TrainingListener::on_step`] with `env_steps`. If it returns `false`,
///    or if `env_steps == total_timesteps`, leave the loop. Otherwise back to 2.
/// 7. Call [`TrainingListener::on_training_end`] once.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|A
///     T[Trainer]-->|env_steps|L[TrainingListener]
///     L -->|save/predict|A
/// ```
pub struct Trainer {
    /// The number of environment steps to train for.
    total_timesteps: usize,

    /// Interval of optimization in environment steps.
    opt_interval: usize,

    /// Interval of recording computational cost in environment steps.
    record_compute_cost_interval: usize,

    /// Interval of recording agent information in optimization steps.
    record_agent_info_interval: usize,

    /// Warmup period in environment steps.
    warmup_period: usize,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            total_timesteps: config.total_timesteps,
            opt_interval: config.opt_interval,
            record_compute_cost_interval: config.record_compute_cost_interval,
            record_agent_info_interval: config.record_agent_info_interval,
            warmup_period: config.warmup_period,
        }
    }

    fn check_intervals(&self) -> Result<(), HarnessError> {
        for (name, v) in [
            ("opt_interval", self.opt_interval),
            ("record_compute_cost_interval", self.record_compute_cost_interval),
            ("record_agent_info_interval", self.record_agent_info_interval),
        ] {
            if v == 0 {
                return Err(HarnessError::InvalidInterval(name));
            }
        }
        Ok(())
    }

    /// Performs a training step.
    ///
    /// First, it performes an environment step with [`Sampler`]. Then, if the number of
    /// environment steps reaches the optimization interval `opt_interval`, performes an
    /// optimization step.
    ///
    /// The second return value in the tuple is if an optimization step is done (`true`).
    /// Fails with [`HarnessError::InvalidInterval`] if an interval is zero.
    pub fn train_step<E, A>(
        &self,
        agent: &mut A,
        sampler: &mut Sampler<E>,
        env_steps: &mut usize,
        opt_steps: &mut usize,
    ) -> Result<(Record, bool)>
    where
        E: Env,
        A: Agent<E>,
    {
        self.check_intervals()?;
        let record = sampler.sample_and_observe(agent)?;
        *env_steps += 1;

        if *env_steps < self.warmup_period || *env_steps % self.opt_interval != 0 {
            Ok((record, false))
        } else if (*opt_steps + 1) % self.record_agent_info_interval == 0 {
            let record_agent = agent.opt_with_record();
            *opt_steps += 1;
            Ok((record.merge(record_agent), true))
        } else {
            agent.opt();
            *opt_steps += 1;
            Ok((record, true))
        }
    }

    /// Trains the agent on `env`.
    ///
    /// The environment is reset by the first step, so `env` may be freshly built.
    /// The agent is put in training mode before the first step.
    ///
    /// # Arguments
    ///
    /// * `env` - the training environment.
    /// * `agent` - the agent to train.
    /// * `listener` - notified after every environment step and once at the end,
    ///   including when it stops the training early.
    /// * `recorder` - receives non-empty records of the steps, tagged with
    ///   `env_steps` and `opt_steps`.
    ///
    /// # Returns
    ///
    /// The number of environment steps done. Fails before any step with
    /// [`HarnessError::InvalidInterval`] if an interval of the configuration is zero.
    pub fn train<E, A, L>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        listener: &mut L,
        recorder: &mut dyn Recorder,
    ) -> Result<usize>
    where
        E: Env,
        A: Agent<E>,
        L: TrainingListener<E, A>,
    {
        self.check_intervals()?;

        let mut sampler = Sampler::new(env);
        let mut env_steps: usize = 0;
        let mut opt_steps: usize = 0;
        sampler.reset_fps_counter();
        agent.train();

        while env_steps < self.total_timesteps {
            let (mut record, _is_opt) =
                self.train_step(agent, &mut sampler, &mut env_steps, &mut opt_steps)?;

            if env_steps % self.record_compute_cost_interval == 0 {
                record.insert("fps", Scalar(sampler.fps()));
                sampler.reset_fps_counter();
            }

            let keep_training = listener.on_step(env_steps, agent)?;

            if !record.is_empty() {
                record.insert("env_steps", Scalar(env_steps as f32));
                record.insert("opt_steps", Scalar(opt_steps as f32));
                recorder.write(record);
            }

            if !keep_training {
                info!("Training stopped by the listener at step {}", env_steps);
                break;
            }
        }

        listener.on_training_end(agent)?;
        info!(
            "Finished training: {} environment steps, {} optimization steps",
            env_steps, opt_steps
        );

        Ok(env_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{CountingListener, ScriptedAgent, ScriptedEnv, ScriptedEnvConfig},
        record::{BufferedRecorder, NullRecorder},
    };

    #[test]
    fn listener_sees_every_step_then_training_end() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default().episode_len(4), 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default();
        let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(10));

        let n = trainer.train(&mut env, &mut agent, &mut listener, &mut NullRecorder::new())?;

        assert_eq!(n, 10);
        assert_eq!(listener.steps, (1..=10).collect::<Vec<_>>());
        assert_eq!(listener.n_training_end, 1);
        assert_eq!(agent.n_observed, 10);
        Ok(())
    }

    #[test]
    fn optimization_respects_interval_and_warmup() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default();
        let config = TrainerConfig::default()
            .total_timesteps(20)
            .opt_interval(4)
            .warmup_period(8);
        let mut trainer = Trainer::build(config);

        trainer.train(&mut env, &mut agent, &mut listener, &mut NullRecorder::new())?;

        // steps 8, 12, 16, 20
        assert_eq!(agent.n_opts, 4);
        Ok(())
    }

    #[test]
    fn listener_can_stop_training() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default().stop_at(3);
        let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(100));

        let n = trainer.train(&mut env, &mut agent, &mut listener, &mut NullRecorder::new())?;

        assert_eq!(n, 3);
        assert_eq!(listener.n_training_end, 1);
        Ok(())
    }

    #[test]
    fn compute_cost_is_recorded_at_interval() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default();
        let mut recorder = BufferedRecorder::new();
        let config = TrainerConfig::default()
            .total_timesteps(9)
            .record_compute_cost_interval(3);
        let mut trainer = Trainer::build(config);

        trainer.train(&mut env, &mut agent, &mut listener, &mut recorder)?;

        let steps = recorder
            .iter()
            .map(|r| r.get_scalar("env_steps").unwrap() as usize)
            .collect::<Vec<_>>();
        assert_eq!(steps, vec![3, 6, 9]);
        assert!(recorder.iter().all(|r| r.get_scalar("fps").is_ok()));
        Ok(())
    }

    #[test]
    fn zero_opt_interval_is_rejected() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default();
        let mut trainer = Trainer::build(TrainerConfig::default().total_timesteps(1).opt_interval(0));

        assert!(trainer
            .train(&mut env, &mut agent, &mut listener, &mut NullRecorder::new())
            .is_err());
        Ok(())
    }

    #[test]
    fn zero_agent_info_interval_is_rejected() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
        let mut agent = ScriptedAgent::default();
        let mut listener = CountingListener::default();
        let config = TrainerConfig::default()
            .total_timesteps(3)
            .record_agent_info_interval(0);
        let mut trainer = Trainer::build(config);

        let err = trainer
            .train(&mut env, &mut agent, &mut listener, &mut NullRecorder::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarnessError>(),
            Some(HarnessError::InvalidInterval("record_agent_info_interval"))
        ));
        assert!(listener.steps.is_empty());
        assert_eq!(listener.n_training_end, 0);
        Ok(())
    }

    #[test]
    fn train_step_rejects_zero_opt_interval() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;
        let mut agent = ScriptedAgent::default();
        let trainer = Trainer::build(TrainerConfig::default().total_timesteps(1).opt_interval(0));
        let mut sampler = Sampler::new(&mut env);
        let (mut env_steps, mut opt_steps) = (0, 0);

        assert!(trainer
            .train_step(&mut agent, &mut sampler, &mut env_steps, &mut opt_steps)
            .is_err());
        assert_eq!(env_steps, 0);
        Ok(())
    }
}
