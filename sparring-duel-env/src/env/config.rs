//! Configuration of [`DuelEnv`](super::DuelEnv).
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configurations of [`DuelEnv`](super::DuelEnv).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DuelEnvConfig {
    /// Enemy id in `1..=8`.
    pub enemy: u8,

    /// Weight of the damage taken by the player in the reward.
    pub weight_player_hitpoint: f64,

    /// Weight of the damage dealt to the enemy in the reward.
    pub weight_enemy_hitpoint: f64,

    /// Randomize initial positions at every reset.
    pub randomini: bool,

    /// The episode is truncated after this number of steps.
    pub time_limit: usize,
}

impl Default for DuelEnvConfig {
    fn default() -> Self {
        Self {
            enemy: 1,
            weight_player_hitpoint: 0.5,
            weight_enemy_hitpoint: 0.5,
            randomini: false,
            time_limit: 3000,
        }
    }
}

impl DuelEnvConfig {
    /// Sets the enemy.
    pub fn enemy(mut self, enemy: u8) -> Self {
        self.enemy = enemy;
        self
    }

    /// Sets the weights of player and enemy damage in the reward.
    pub fn weights(mut self, player: f64, enemy: f64) -> Self {
        self.weight_player_hitpoint = player;
        self.weight_enemy_hitpoint = enemy;
        self
    }

    /// Sets if initial positions are random.
    pub fn randomini(mut self, v: bool) -> Self {
        self.randomini = v;
        self
    }

    /// Sets the time limit in steps.
    pub fn time_limit(mut self, v: usize) -> Self {
        self.time_limit = v;
        self
    }

    /// Reward collected for beating the enemy from full life without taking damage.
    pub fn win_value(&self) -> f64 {
        self.weight_enemy_hitpoint * super::MAX_LIFE as f64
    }

    /// Checks the enemy id and the time limit.
    pub fn validate(&self) -> Result<()> {
        if !(1..=8).contains(&self.enemy) {
            bail!("Enemy id must be in 1..=8, got {}", self.enemy);
        }
        if self.time_limit == 0 {
            bail!("time_limit must be positive");
        }
        Ok(())
    }

    /// Constructs [`DuelEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DuelEnvConfig`].
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
    fn enemy_out_of_range_is_invalid() {
        assert!(DuelEnvConfig::default().enemy(0).validate().is_err());
        assert!(DuelEnvConfig::default().enemy(9).validate().is_err());
        assert!(DuelEnvConfig::default().enemy(8).validate().is_ok());
    }

    #[test]
    fn test_serde_duel_env_config() -> Result<()> {
        let config = DuelEnvConfig::default()
            .enemy(4)
            .weights(0.4, 0.6)
            .randomini(true);
        let dir = TempDir::new("duel_env_config")?;
        let path = dir.path().join("duel_env_config.yaml");
        config.save(&path)?;
        assert_eq!(config, DuelEnvConfig::load(&path)?);
        Ok(())
    }
}
