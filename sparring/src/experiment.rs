//! The loop over runs, enemies and reward weightings.
use crate::{
    enemy_name, AgentBuilder, EnemyLogs, EnvVariant, EvalEnv, ExperimentConfig, ExperimentGrid,
    RunLayout, TrainEnv,
};
use anyhow::Result;
use log::info;
use sparring_core::{
    log_sink::LogCell,
    record::{LogRecorder, NullRecorder, Recorder},
    Env as _, EvalScheduler, FrameSkip, FrameStack, Monitor, Trainer,
};
use sparring_duel_env::DuelEnv;

/// Trains agents on every [`EnvVariant`] of an [`ExperimentGrid`], run after run.
///
/// For each variant, the agent is trained on a monitored environment with the
/// weighted reward ([`TrainEnv`]), while an [`EvalScheduler`] saves checkpoints,
/// records videos and evaluates it on an environment with unweighted rewards
/// ([`EvalEnv`]). Intervals and evaluation lengths count agent steps, each of
/// which spans [`FrameSkip::DEFAULT_SKIP`] game steps; training lengths count
/// game steps. At the end of the
/// training of a variant, one row is appended to each summary file of the enemy
/// (see [`EnemyLogs`]):
///
/// * mean evaluation lengths after `[EnemyName, ""]`,
/// * mean evaluation rewards after `["EnemyName (wp, we)", "<win value>"]`,
/// * training episode lengths and rewards after the same prefixes.
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    /// Constructs an experiment.
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Performs `runs` runs, or runs until interrupted if `None`.
    ///
    /// Returns the number of completed runs.
    pub fn run<B: AgentBuilder>(&self, runs: Option<usize>, builder: &B) -> Result<usize> {
        let grid = ExperimentGrid::build(&self.config.enemies, &self.config.weights)?;
        let mut run = 0;
        while runs.map_or(true, |n| run < n) {
            self.run_once(run, &grid, builder)?;
            run += 1;
        }
        Ok(run)
    }

    /// Performs the run with index `run` over all variants of `grid`.
    pub fn run_once<B: AgentBuilder>(
        &self,
        run: usize,
        grid: &ExperimentGrid,
        builder: &B,
    ) -> Result<()> {
        info!("Starting run {}!", run);
        let layout = RunLayout::new(&self.config.output_dir, builder.algorithm(), run);

        for enemy in grid.enemies() {
            let name = enemy_name(enemy)?;
            let logs = layout.enemy_logs(enemy)?;
            for variant in grid.variants_of(enemy) {
                self.train_variant(run, &layout, &logs, variant, builder)?;
                info!("Finished {} {}", name, variant.label());
            }
            info!("Finished {} completely", name);
        }
        Ok(())
    }

    fn train_variant<B: AgentBuilder>(
        &self,
        run: usize,
        layout: &RunLayout,
        logs: &EnemyLogs,
        variant: &EnvVariant,
        builder: &B,
    ) -> Result<()> {
        let name = enemy_name(variant.enemy())?;
        let seed = self.config.seed.wrapping_add(run as i64);

        let mut env: TrainEnv = frames(Monitor::new(DuelEnv::build(
            &variant.train_config(),
            seed,
        )?))?;
        let eval_env: EvalEnv = frames(DuelEnv::build(
            &variant.eval_config(),
            seed.wrapping_add(1),
        )?)?;
        let mut agent = builder.build(variant, seed as u64)?;

        let lengths_prefix = vec![name.to_string(), String::new()];
        let rewards_prefix = vec![
            format!("{} {}", name, variant.label()),
            format!("{:?}", variant.train_config().win_value()),
        ];

        let scheduler_config = self
            .config
            .scheduler_config()
            .checkpoint_dir(layout.models_dir(variant)?)
            .video_dir(layout.videos_dir(variant)?)
            .raw_data_dir(layout.raw_data_dir(variant)?)
            .lengths_history(logs.evaluation_lengths.path(), lengths_prefix.clone())
            .rewards_history(logs.evaluation_rewards.path(), rewards_prefix.clone());
        let mut scheduler = EvalScheduler::build(scheduler_config, eval_env)?
            .recorder(Box::new(LogRecorder::new(format!("eval {}", name))));

        let mut recorder: Box<dyn Recorder> = match self.config.log_training_episodes {
            true => Box::new(LogRecorder::new(format!("train {}", name))),
            false => Box::new(NullRecorder::new()),
        };
        let mut trainer = Trainer::build(self.config.trainer_config());
        trainer.train(&mut env, &mut agent, &mut scheduler, recorder.as_mut())?;

        let monitor = env.inner().inner();
        let lengths_prefix = to_cells(&lengths_prefix);
        let rewards_prefix = to_cells(&rewards_prefix);
        logs.training_lengths
            .append_values(&lengths_prefix, monitor.episode_lengths())?;
        logs.training_rewards
            .append_values(&rewards_prefix, monitor.episode_rewards())?;
        Ok(())
    }
}

/// Skips two frames per action and stacks three observations.
fn frames<E>(env: E) -> Result<FrameStack<FrameSkip<E>>> {
    FrameStack::new(
        FrameSkip::new(env, FrameSkip::<E>::DEFAULT_SKIP)?,
        FrameStack::<E>::DEFAULT_N_STACK,
    )
}

fn to_cells(prefix: &[String]) -> Vec<LogCell> {
    prefix.iter().map(|s| LogCell::from(s.as_str())).collect()
}
