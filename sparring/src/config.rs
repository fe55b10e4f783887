//! Configuration of [`Experiment`](crate::Experiment).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sparring_core::{SchedulerConfig, TrainerConfig};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Experiment`](crate::Experiment).
///
/// Missing fields in a YAML file take their default values.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Environment steps per trained variant.
    pub total_timesteps: usize,

    /// Interval of optimization steps in environment steps.
    pub opt_interval: usize,

    /// Interval of evaluation passes in environment steps.
    pub evaluation_interval: usize,

    /// Episodes in an evaluation pass.
    pub episodes_per_evaluation: usize,

    /// Interval of checkpoints in environment steps.
    pub checkpoint_interval: usize,

    /// Interval of videos in environment steps.
    pub video_interval: usize,

    /// Cap on the length of evaluation and video episodes.
    pub max_episode_steps: usize,

    /// Evaluate with the deterministic policy.
    pub deterministic: bool,

    /// Enemy ids to train against.
    pub enemies: Vec<u8>,

    /// Weights of the damage taken by the player in the training reward.
    pub weights: Vec<f64>,

    /// Root of the output files.
    pub output_dir: PathBuf,

    /// Base random seed of the environments and agents.
    pub seed: i64,

    /// Log the reward and length of every training episode.
    pub log_training_episodes: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            total_timesteps: 250_000,
            opt_interval: 1,
            evaluation_interval: 12_500,
            episodes_per_evaluation: 25,
            checkpoint_interval: 100_000,
            video_interval: 250_000,
            max_episode_steps: 3500,
            deterministic: false,
            enemies: (2..=8).collect(),
            weights: vec![0.1, 0.4, 0.5],
            output_dir: PathBuf::from("FullTime"),
            seed: 42,
            log_training_episodes: false,
        }
    }
}

impl ExperimentConfig {
    /// Sets the number of environment steps per variant.
    pub fn total_timesteps(mut self, v: usize) -> Self {
        self.total_timesteps = v;
        self
    }

    /// Sets the interval of evaluation passes.
    pub fn evaluation_interval(mut self, v: usize) -> Self {
        self.evaluation_interval = v;
        self
    }

    /// Sets the number of episodes in an evaluation pass.
    pub fn episodes_per_evaluation(mut self, v: usize) -> Self {
        self.episodes_per_evaluation = v;
        self
    }

    /// Sets the interval of checkpoints.
    pub fn checkpoint_interval(mut self, v: usize) -> Self {
        self.checkpoint_interval = v;
        self
    }

    /// Sets the interval of videos.
    pub fn video_interval(mut self, v: usize) -> Self {
        self.video_interval = v;
        self
    }

    /// Sets the cap on the length of evaluation and video episodes.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Sets the enemies.
    pub fn enemies(mut self, v: Vec<u8>) -> Self {
        self.enemies = v;
        self
    }

    /// Sets the weights of the damage taken by the player.
    pub fn weights(mut self, v: Vec<f64>) -> Self {
        self.weights = v;
        self
    }

    /// Sets the root of the output files.
    pub fn output_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.output_dir = v.as_ref().to_path_buf();
        self
    }

    /// Sets the base random seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Configuration of the training loop of a variant.
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig::default()
            .total_timesteps(self.total_timesteps)
            .opt_interval(self.opt_interval)
    }

    /// Intervals and episode settings of the scheduler, without output paths.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .checkpoint_interval(self.checkpoint_interval)
            .video_interval(self.video_interval)
            .evaluation_interval(self.evaluation_interval)
            .episodes_per_evaluation(self.episodes_per_evaluation)
            .max_episode_steps(self.max_episode_steps)
            .deterministic(self.deterministic)
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_experiment_config() -> Result<()> {
        let config = ExperimentConfig::default()
            .total_timesteps(1000)
            .enemies(vec![3, 5])
            .output_dir("out");
        let dir = TempDir::new("experiment_config")?;
        let path = dir.path().join("experiment_config.yaml");
        config.save(&path)?;
        assert_eq!(config, ExperimentConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn missing_fields_take_defaults() -> Result<()> {
        let config: ExperimentConfig = serde_yaml::from_str("total_timesteps: 500\n")?;
        assert_eq!(config.total_timesteps, 500);
        assert_eq!(config.enemies, vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(config.evaluation_interval, 12_500);
        assert_eq!(config.episodes_per_evaluation, 25);
        Ok(())
    }

    #[test]
    fn scheduler_config_carries_intervals() {
        let config = ExperimentConfig::default();
        let sched = config.scheduler_config();
        assert_eq!(sched.checkpoint_interval, 100_000);
        assert_eq!(sched.video_interval, 250_000);
        assert_eq!(sched.evaluation_interval, 12_500);
        assert_eq!(sched.episodes_per_evaluation, 25);
        assert_eq!(sched.max_episode_steps, 3500);
        assert!(sched.checkpoint_dir.is_none());
    }
}
