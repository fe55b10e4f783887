//! Periodic checkpointing, video recording and evaluation during training.
mod config;
use crate::{
    error::HarnessError,
    evaluator::{play_episode, EvaluationBatch},
    log_sink::{CsvLogSink, LogCell},
    record::{NullRecorder, Record, RecordValue, Recorder},
    util::ensure_dir,
    video::{FrameRetention, MjpegAviEncoder, VideoEncoder, VIDEO_FPS},
    Agent, Combatants, Env, FrameSource, Policy, TrainingListener,
};
use anyhow::Result;
use chrono::Local;
pub use config::SchedulerConfig;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// A [`TrainingListener`] saving checkpoints, recording videos and running
/// evaluation passes at fixed intervals of environment steps.
///
/// At a step `n`, in this order:
///
/// 1. if `n % checkpoint_interval == 0`, the agent is saved to `<checkpoint_dir>/<n>.model`.
///    A failure is logged and training continues.
/// 2. if `n % video_interval == 0`, one episode is played on the evaluation environment
///    with frame retention turned on and the frames are encoded to `<video_dir>/<n>.avi`.
/// 3. if `n % evaluation_interval == 0`, `episodes_per_evaluation` episodes are played,
///    one row is appended to `<raw_data_dir>/wins.csv` and one to
///    `<raw_data_dir>/rewards.csv`, and the mean length and mean reward of the pass are
///    appended to the running history.
///
/// Each side effect is skipped when its directory is not configured. Episodes are
/// capped at `max_episode_steps`; a capped episode counts as a loss.
///
/// At training end, the running history is appended to the lengths and rewards
/// history files after their prefixes.
///
/// The evaluation environment is owned by the scheduler and never shared with
/// the training environment.
pub struct EvalScheduler<E> {
    env: E,
    checkpoint_dir: Option<PathBuf>,
    video_dir: Option<PathBuf>,
    raw_data: Option<(CsvLogSink, CsvLogSink)>,
    checkpoint_interval: usize,
    video_interval: usize,
    evaluation_interval: usize,
    episodes_per_evaluation: usize,
    max_episode_steps: usize,
    deterministic: bool,
    lengths_history: Option<CsvLogSink>,
    rewards_history: Option<CsvLogSink>,
    lengths_prefix: Vec<String>,
    rewards_prefix: Vec<String>,
    mean_lengths: Vec<f32>,
    mean_rewards: Vec<f32>,
    flushed: bool,
    encoder: Box<dyn VideoEncoder>,
    recorder: Box<dyn Recorder>,
}

impl<E> EvalScheduler<E>
where
    E: Env + Combatants + FrameSource,
{
    /// Constructs a scheduler evaluating on `env`.
    ///
    /// # Arguments
    ///
    /// * `config` - intervals, episode budget and output locations. A location
    ///   left unset disables the matching side effect: checkpoints, videos,
    ///   per-evaluation raw data (`wins.csv`, `rewards.csv`) or the history rows
    ///   written by [`TrainingListener::on_training_end`].
    /// * `env` - the evaluation environment. It is separate from the training
    ///   environment and is only stepped during evaluation and video episodes.
    ///
    /// # Returns
    ///
    /// The scheduler with an empty running history, encoding videos with
    /// [`MjpegAviEncoder`] and recording evaluation summaries nowhere until
    /// [`EvalScheduler::encoder`] or [`EvalScheduler::recorder`] replace them.
    ///
    /// Configured directories are created if they do not exist; an existing
    /// directory is not an error. Fails with [`HarnessError::InvalidInterval`] if
    /// an interval or `max_episode_steps` is zero, or if a directory cannot be
    /// created.
    pub fn build(config: SchedulerConfig, env: E) -> Result<Self> {
        config.validate()?;

        for dir in [&config.checkpoint_dir, &config.video_dir, &config.raw_data_dir]
            .into_iter()
            .flatten()
        {
            ensure_dir(dir)?;
        }

        let raw_data = config
            .raw_data_dir
            .as_ref()
            .map(|dir| (CsvLogSink::new(dir.join("wins.csv")), CsvLogSink::new(dir.join("rewards.csv"))));

        Ok(Self {
            env,
            checkpoint_dir: config.checkpoint_dir,
            video_dir: config.video_dir,
            raw_data,
            checkpoint_interval: config.checkpoint_interval,
            video_interval: config.video_interval,
            evaluation_interval: config.evaluation_interval,
            episodes_per_evaluation: config.episodes_per_evaluation,
            max_episode_steps: config.max_episode_steps,
            deterministic: config.deterministic,
            lengths_history: config.lengths_history.map(CsvLogSink::new),
            rewards_history: config.rewards_history.map(CsvLogSink::new),
            lengths_prefix: config.lengths_prefix,
            rewards_prefix: config.rewards_prefix,
            mean_lengths: vec![],
            mean_rewards: vec![],
            flushed: false,
            encoder: Box::new(MjpegAviEncoder::default()),
            recorder: Box::new(NullRecorder::new()),
        })
    }

    /// Replaces the video encoder.
    pub fn encoder(mut self, encoder: impl VideoEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Sets a recorder receiving a record per evaluation pass.
    pub fn recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// The evaluation environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Mean episode lengths of the evaluation passes so far.
    pub fn mean_lengths(&self) -> &[f32] {
        &self.mean_lengths
    }

    /// Mean rewards of the evaluation passes so far.
    pub fn mean_rewards(&self) -> &[f32] {
        &self.mean_rewards
    }

    fn save_checkpoint<T: Env, A: Agent<T>>(agent: &A, dir: &Path, step: usize) {
        let path = dir.join(format!("{}.model", step));
        match agent.save_params(&path) {
            Ok(()) => info!("Saved the model in {:?}.", &path),
            Err(e) => warn!("Failed to save the model in {:?}: {}", &path, e),
        }
    }

    fn record_video<P: Policy<E>>(&mut self, policy: &mut P, dir: &Path, step: usize) -> Result<()> {
        let path = dir.join(format!("{}.{}", step, self.encoder.extension()));
        let frames = {
            let mut retention = FrameRetention::new(&mut self.env);
            let run = play_episode(
                retention.env(),
                policy,
                0,
                self.max_episode_steps,
                self.deterministic,
            )?;
            if !run.is_done {
                warn!("Video episode reached the cap of {} steps", self.max_episode_steps);
            }
            retention.env().take_frames()
        };

        if frames.is_empty() {
            warn!("No frame retained for {:?}", &path);
            return Ok(());
        }
        let size = self.env.frame_size();
        self.encoder.encode(&path, &frames, size, VIDEO_FPS)?;
        info!("Saved a video of {} frames in {:?}.", frames.len(), &path);
        Ok(())
    }

    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P, step: usize) -> Result<()> {
        let (wins_sink, rewards_sink) = match &self.raw_data {
            Some(sinks) => sinks,
            None => return Ok(()),
        };

        let batch = EvaluationBatch::collect(
            &mut self.env,
            policy,
            self.episodes_per_evaluation,
            self.max_episode_steps,
            self.deterministic,
        )?;

        let header = [
            LogCell::from(step),
            LogCell::from(self.episodes_per_evaluation),
            LogCell::Blank,
        ];
        let row = |values: Vec<LogCell>| header.iter().cloned().chain(values).collect::<Vec<_>>();
        let wins_row = row(batch.wins().into_iter().map(LogCell::from).collect());
        let rewards_row = row(batch.rewards().into_iter().map(LogCell::from).collect());
        // wins.csv first, then rewards.csv
        CsvLogSink::append_rows(&[
            (wins_sink, &wins_row[..]),
            (rewards_sink, &rewards_row[..]),
        ])?;

        let (mean_length, mean_reward) = (batch.mean_length(), batch.mean_reward());
        self.mean_lengths.push(mean_length);
        self.mean_rewards.push(mean_reward);

        info!(
            "Evaluation at step {}: {}/{} wins, mean reward = {}, mean length = {}",
            step,
            batch.n_wins(),
            batch.len(),
            mean_reward,
            mean_length
        );
        self.recorder.write(Record::from_slice(&[
            ("env_steps", RecordValue::Scalar(step as f32)),
            ("win_rate", RecordValue::Scalar(batch.win_rate())),
            ("mean_reward", RecordValue::Scalar(mean_reward)),
            ("mean_length", RecordValue::Scalar(mean_length)),
            ("rewards", RecordValue::Array1(batch.rewards())),
            ("time", RecordValue::DateTime(Local::now())),
        ]));
        Ok(())
    }

    fn record_and_evaluate<P: Policy<E>>(
        &mut self,
        policy: &mut P,
        video_dir: Option<&Path>,
        evaluate: bool,
        step: usize,
    ) -> Result<()> {
        if let Some(dir) = video_dir {
            self.record_video(policy, dir, step)?;
        }
        if evaluate {
            self.evaluate(policy, step)?;
        }
        Ok(())
    }

    /// Appends the running history to the history files.
    ///
    /// Fails if called more than once.
    pub fn flush_history(&mut self) -> Result<()> {
        if self.flushed {
            return Err(HarnessError::AlreadyFlushed.into());
        }
        self.flushed = true;

        for (sink, prefix, history) in [
            (&self.lengths_history, &self.lengths_prefix, &self.mean_lengths),
            (&self.rewards_history, &self.rewards_prefix, &self.mean_rewards),
        ] {
            if let Some(sink) = sink {
                let prefix = prefix.iter().map(|s| LogCell::from(s.as_str())).collect::<Vec<_>>();
                sink.append_values(&prefix, history)?;
            }
        }
        Ok(())
    }
}

impl<T, E, A> TrainingListener<T, A> for EvalScheduler<E>
where
    T: Env,
    E: Env + Combatants + FrameSource,
    A: Agent<T> + Policy<E>,
{
    fn on_step(&mut self, env_steps: usize, agent: &mut A) -> Result<bool> {
        if let Some(dir) = &self.checkpoint_dir {
            if env_steps % self.checkpoint_interval == 0 {
                Self::save_checkpoint::<T, A>(agent, dir, env_steps);
            }
        }

        let video_dir = self
            .video_dir
            .clone()
            .filter(|_| env_steps % self.video_interval == 0);
        let evaluate = self.raw_data.is_some() && env_steps % self.evaluation_interval == 0;

        if video_dir.is_some() || evaluate {
            let was_train = agent.is_train();
            agent.eval();
            let result = self.record_and_evaluate(agent, video_dir.as_deref(), evaluate, env_steps);
            if was_train {
                agent.train();
            }
            result?;
        }

        Ok(true)
    }

    fn on_training_end(&mut self, _agent: &mut A) -> Result<()> {
        self.flush_history()
    }
}
