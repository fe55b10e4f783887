//! Environment configurations of an experiment.
use crate::{enemy_name, ExperimentError};
use anyhow::Result;
use sparring_duel_env::DuelEnvConfig;

/// An enemy and a reward weighting to train on.
///
/// The weight of the damage dealt to the enemy is `1 - weight_player_hitpoint`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvVariant {
    enemy: u8,
    weight_player_hitpoint: f64,
    weight_enemy_hitpoint: f64,
}

impl EnvVariant {
    /// Constructs a variant, checking the enemy id and the weight.
    pub fn new(enemy: u8, weight_player_hitpoint: f64) -> Result<Self, ExperimentError> {
        enemy_name(enemy)?;
        if !(0.0..=1.0).contains(&weight_player_hitpoint) {
            return Err(ExperimentError::InvalidWeight(weight_player_hitpoint));
        }
        Ok(Self {
            enemy,
            weight_player_hitpoint,
            weight_enemy_hitpoint: 1.0 - weight_player_hitpoint,
        })
    }

    /// Enemy id.
    pub fn enemy(&self) -> u8 {
        self.enemy
    }

    /// Weights of the damage taken by the player and dealt to the enemy.
    pub fn weights(&self) -> (f64, f64) {
        (self.weight_player_hitpoint, self.weight_enemy_hitpoint)
    }

    /// The weights as a tuple, e.g. `(0.1, 0.9)`.
    pub fn label(&self) -> String {
        format!(
            "({:?}, {:?})",
            self.weight_player_hitpoint, self.weight_enemy_hitpoint
        )
    }

    /// Configuration of the training environment.
    pub fn train_config(&self) -> DuelEnvConfig {
        DuelEnvConfig::default()
            .enemy(self.enemy)
            .weights(self.weight_player_hitpoint, self.weight_enemy_hitpoint)
            .randomini(true)
    }

    /// Configuration of the evaluation environment, weighting both damages by one.
    pub fn eval_config(&self) -> DuelEnvConfig {
        DuelEnvConfig::default()
            .enemy(self.enemy)
            .weights(1.0, 1.0)
            .randomini(true)
    }
}

/// All [`EnvVariant`]s of an experiment, grouped by enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentGrid {
    variants: Vec<EnvVariant>,
}

impl ExperimentGrid {
    /// Builds the grid of `enemies` times `weights`, in that order.
    pub fn build(enemies: &[u8], weights: &[f64]) -> Result<Self> {
        let mut variants = Vec::with_capacity(enemies.len() * weights.len());
        for &enemy in enemies {
            for &w in weights {
                variants.push(EnvVariant::new(enemy, w)?);
            }
        }
        Ok(Self { variants })
    }

    /// Enemies in the grid, in order of appearance.
    pub fn enemies(&self) -> Vec<u8> {
        let mut enemies: Vec<u8> = vec![];
        for v in self.variants.iter() {
            if !enemies.contains(&v.enemy) {
                enemies.push(v.enemy);
            }
        }
        enemies
    }

    /// Variants with the given enemy.
    pub fn variants_of(&self, enemy: u8) -> impl Iterator<Item = &EnvVariant> {
        self.variants.iter().filter(move |v| v.enemy == enemy)
    }

    /// All variants.
    pub fn iter(&self) -> impl Iterator<Item = &EnvVariant> {
        self.variants.iter()
    }

    /// The number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` if the grid has no variant.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_enemy_major() -> Result<()> {
        let grid = ExperimentGrid::build(&[2, 3], &[0.1, 0.4, 0.5])?;
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.enemies(), vec![2, 3]);
        let labels = grid.variants_of(3).map(|v| v.label()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["(0.1, 0.9)", "(0.4, 0.6)", "(0.5, 0.5)"]);
        assert!(grid.iter().take(3).all(|v| v.enemy() == 2));
        Ok(())
    }

    #[test]
    fn training_and_evaluation_configs() -> Result<()> {
        let v = EnvVariant::new(4, 0.1)?;
        let train = v.train_config();
        assert_eq!(train.enemy, 4);
        assert_eq!(train.weight_player_hitpoint, 0.1);
        assert_eq!(train.weight_enemy_hitpoint, 0.9);
        assert!(train.randomini);

        let eval = v.eval_config();
        assert_eq!(eval.enemy, 4);
        assert_eq!((eval.weight_player_hitpoint, eval.weight_enemy_hitpoint), (1.0, 1.0));
        assert!(eval.randomini);
        Ok(())
    }

    #[test]
    fn invalid_variants() {
        assert_eq!(EnvVariant::new(9, 0.1), Err(ExperimentError::UnknownEnemy(9)));
        assert_eq!(EnvVariant::new(2, 1.5), Err(ExperimentError::InvalidWeight(1.5)));
        assert!(ExperimentGrid::build(&[2, 0], &[0.1]).is_err());
    }
}
