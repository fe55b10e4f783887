//! Configuration of [`EvalScheduler`](super::EvalScheduler).
use crate::error::HarnessError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`EvalScheduler`](super::EvalScheduler).
///
/// A side effect whose directory or file is `None` is skipped.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SchedulerConfig {
    /// Directory of model checkpoints, `<step>.model`.
    pub checkpoint_dir: Option<PathBuf>,

    /// Directory of recorded videos, `<step>.avi`.
    pub video_dir: Option<PathBuf>,

    /// Directory of `wins.csv` and `rewards.csv`.
    pub raw_data_dir: Option<PathBuf>,

    /// Interval of checkpoints in environment steps.
    pub checkpoint_interval: usize,

    /// Interval of videos in environment steps.
    pub video_interval: usize,

    /// Interval of evaluation passes in environment steps.
    pub evaluation_interval: usize,

    /// Episodes per evaluation pass.
    pub episodes_per_evaluation: usize,

    /// Step cap of evaluation and video episodes.
    pub max_episode_steps: usize,

    /// Take deterministic actions in evaluation and video episodes.
    pub deterministic: bool,

    /// File receiving the mean episode lengths of all passes at training end.
    pub lengths_history: Option<PathBuf>,

    /// File receiving the mean rewards of all passes at training end.
    pub rewards_history: Option<PathBuf>,

    /// Leading cells of the lengths history row.
    pub lengths_prefix: Vec<String>,

    /// Leading cells of the rewards history row.
    pub rewards_prefix: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: None,
            video_dir: None,
            raw_data_dir: None,
            checkpoint_interval: 100_000,
            video_interval: 250_000,
            evaluation_interval: 10_000,
            episodes_per_evaluation: 5,
            max_episode_steps: 3500,
            deterministic: false,
            lengths_history: None,
            rewards_history: None,
            lengths_prefix: vec![],
            rewards_prefix: vec![],
        }
    }
}

impl SchedulerConfig {
    /// Sets the directory of checkpoints.
    pub fn checkpoint_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.checkpoint_dir = Some(v.as_ref().to_path_buf());
        self
    }

    /// Sets the directory of videos.
    pub fn video_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.video_dir = Some(v.as_ref().to_path_buf());
        self
    }

    /// Sets the directory of raw evaluation data.
    pub fn raw_data_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.raw_data_dir = Some(v.as_ref().to_path_buf());
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

    /// Sets the interval of evaluation passes.
    pub fn evaluation_interval(mut self, v: usize) -> Self {
        self.evaluation_interval = v;
        self
    }

    /// Sets the number of episodes per evaluation pass.
    pub fn episodes_per_evaluation(mut self, v: usize) -> Self {
        self.episodes_per_evaluation = v;
        self
    }

    /// Sets the step cap of evaluation and video episodes.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Sets if actions are deterministic in evaluation.
    pub fn deterministic(mut self, v: bool) -> Self {
        self.deterministic = v;
        self
    }

    /// Sets the lengths history file and the leading cells of its row.
    pub fn lengths_history(mut self, path: impl AsRef<Path>, prefix: Vec<String>) -> Self {
        self.lengths_history = Some(path.as_ref().to_path_buf());
        self.lengths_prefix = prefix;
        self
    }

    /// Sets the rewards history file and the leading cells of its row.
    pub fn rewards_history(mut self, path: impl AsRef<Path>, prefix: Vec<String>) -> Self {
        self.rewards_history = Some(path.as_ref().to_path_buf());
        self.rewards_prefix = prefix;
        self
    }

    /// Checks that intervals and the step cap are positive.
    pub fn validate(&self) -> Result<(), HarnessError> {
        for (name, v) in [
            ("checkpoint_interval", self.checkpoint_interval),
            ("video_interval", self.video_interval),
            ("evaluation_interval", self.evaluation_interval),
            ("max_episode_steps", self.max_episode_steps),
        ] {
            if v == 0 {
                return Err(HarnessError::InvalidInterval(name));
            }
        }
        Ok(())
    }

    /// Constructs [`SchedulerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SchedulerConfig`].
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
    fn zero_interval_is_invalid() {
        let config = SchedulerConfig::default().video_interval(0);
        assert!(matches!(
            config.validate(),
            Err(HarnessError::InvalidInterval("video_interval"))
        ));
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_serde_scheduler_config() -> Result<()> {
        let config = SchedulerConfig::default()
            .raw_data_dir("raw-data/(0.1, 0.9)")
            .evaluation_interval(12_500)
            .episodes_per_evaluation(25)
            .rewards_history("Evaluation_rewards.csv", vec!["AirMan (0.1, 0.9)".into(), "90".into()]);

        let dir = TempDir::new("scheduler_config")?;
        let path = dir.path().join("scheduler_config.yaml");
        config.save(&path)?;
        assert_eq!(config, SchedulerConfig::load(&path)?);
        Ok(())
    }
}
