//! Outcomes of an evaluation pass.
use super::run_episode;
use crate::{Combatants, Env, Policy};
use anyhow::Result;

/// Outcome of an evaluation episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    /// The opponent had no health left when the episode ended.
    pub win: bool,

    /// Cumulative reward.
    pub reward: f32,

    /// Number of steps.
    pub length: usize,

    /// The episode was cut at the step cap.
    pub capped: bool,
}

/// Episode outcomes collected during one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct EvaluationBatch {
    outcomes: Vec<EpisodeOutcome>,
}

impl EvaluationBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `n_episodes` episodes on `env` and collects their outcomes.
    pub fn collect<E, P>(
        env: &mut E,
        policy: &mut P,
        n_episodes: usize,
        max_steps: usize,
        deterministic: bool,
    ) -> Result<Self>
    where
        E: Env + Combatants,
        P: Policy<E>,
    {
        let mut batch = Self {
            outcomes: Vec::with_capacity(n_episodes),
        };
        for ix in 0..n_episodes {
            let outcome = run_episode(env, policy, ix, max_steps, deterministic)?;
            log::debug!(
                "Episode {}: reward = {}, length = {}, win = {}",
                ix,
                outcome.reward,
                outcome.length,
                outcome.win
            );
            if outcome.capped {
                log::warn!("Evaluation episode {} reached the cap of {} steps", ix, max_steps);
            }
            batch.push(outcome);
        }
        Ok(batch)
    }

    /// Adds an outcome.
    pub fn push(&mut self, outcome: EpisodeOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes in the order the episodes were played.
    pub fn outcomes(&self) -> &[EpisodeOutcome] {
        &self.outcomes
    }

    /// Number of episodes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` if no episode was played.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// `1` for a win and `0` for a loss, per episode.
    pub fn wins(&self) -> Vec<u8> {
        self.outcomes.iter().map(|o| o.win as u8).collect()
    }

    /// Cumulative rewards per episode.
    pub fn rewards(&self) -> Vec<f32> {
        self.outcomes.iter().map(|o| o.reward).collect()
    }

    /// Episode lengths.
    pub fn lengths(&self) -> Vec<usize> {
        self.outcomes.iter().map(|o| o.length).collect()
    }

    /// Number of won episodes.
    pub fn n_wins(&self) -> usize {
        self.outcomes.iter().filter(|o| o.win).count()
    }

    /// Fraction of won episodes, `0` for an empty batch.
    pub fn win_rate(&self) -> f32 {
        mean(self.outcomes.iter().map(|o| o.win as u8 as f32))
    }

    /// Mean episode length, `0` for an empty batch.
    pub fn mean_length(&self) -> f32 {
        mean(self.outcomes.iter().map(|o| o.length as f32))
    }

    /// Mean cumulative reward, `0` for an empty batch.
    pub fn mean_reward(&self) -> f32 {
        mean(self.outcomes.iter().map(|o| o.reward))
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = values.fold((0f32, 0usize), |(s, n), v| (s + v, n + 1));
    match n {
        0 => 0.0,
        n => sum / n as f32,
    }
}
