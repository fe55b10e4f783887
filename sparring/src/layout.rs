//! Output paths of a run.
use crate::{enemy_name, EnvVariant};
use anyhow::Result;
use sparring_core::{log_sink::CsvLogSink, util::ensure_dir};
use std::path::{Path, PathBuf};

/// Summary files of an enemy, one row per trained variant.
pub struct EnemyLogs {
    /// Mean evaluation episode lengths, one value per evaluation pass.
    pub evaluation_lengths: CsvLogSink,

    /// Mean evaluation rewards, one value per evaluation pass.
    pub evaluation_rewards: CsvLogSink,

    /// Lengths of the training episodes.
    pub training_lengths: CsvLogSink,

    /// Rewards of the training episodes.
    pub training_rewards: CsvLogSink,
}

/// Paths of the output files of a run, rooted at `<output_dir>/<algorithm>/run<r>`.
#[derive(Debug, Clone)]
pub struct RunLayout {
    run_dir: PathBuf,
}

impl RunLayout {
    /// Layout of the run `run` of `algorithm`.
    pub fn new(output_dir: impl AsRef<Path>, algorithm: &str, run: usize) -> Self {
        Self {
            run_dir: output_dir
                .as_ref()
                .join(algorithm)
                .join(format!("run{}", run)),
        }
    }

    /// The root directory of the run.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// `<run_dir>/<EnemyName>`.
    pub fn enemy_dir(&self, enemy: u8) -> Result<PathBuf> {
        Ok(self.run_dir.join(enemy_name(enemy)?))
    }

    /// `<enemy_dir>/models/(<wp>, <we>)`.
    pub fn models_dir(&self, variant: &EnvVariant) -> Result<PathBuf> {
        self.variant_dir("models", variant)
    }

    /// `<enemy_dir>/videos/(<wp>, <we>)`.
    pub fn videos_dir(&self, variant: &EnvVariant) -> Result<PathBuf> {
        self.variant_dir("videos", variant)
    }

    /// `<enemy_dir>/raw-data/(<wp>, <we>)`.
    pub fn raw_data_dir(&self, variant: &EnvVariant) -> Result<PathBuf> {
        self.variant_dir("raw-data", variant)
    }

    fn variant_dir(&self, kind: &str, variant: &EnvVariant) -> Result<PathBuf> {
        Ok(self.enemy_dir(variant.enemy())?.join(kind).join(variant.label()))
    }

    /// Creates the directory of the enemy and returns its summary files.
    pub fn enemy_logs(&self, enemy: u8) -> Result<EnemyLogs> {
        let dir = self.enemy_dir(enemy)?;
        ensure_dir(&dir)?;
        Ok(EnemyLogs {
            evaluation_lengths: CsvLogSink::new(dir.join("Evaluation_lengths.csv")),
            evaluation_rewards: CsvLogSink::new(dir.join("Evaluation_rewards.csv")),
            training_lengths: CsvLogSink::new(dir.join("Training_lengths.csv")),
            training_rewards: CsvLogSink::new(dir.join("Training_rewards.csv")),
        })
    }
}
