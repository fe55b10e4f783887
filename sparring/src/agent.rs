//! Agents trained by [`Experiment`](crate::Experiment).
use crate::EnvVariant;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use sparring_core::{record::Record, Agent, Env, FrameSkip, FrameStack, Monitor, Policy, Step};
use sparring_duel_env::{DuelAct, DuelEnv};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Environment agents are trained on.
///
/// Actions are repeated over two game steps and the last three observations
/// are stacked. Episode statistics are kept per game step.
pub type TrainEnv = FrameStack<FrameSkip<Monitor<DuelEnv>>>;

/// Environment agents are evaluated on, with the same frame skipping and stacking.
pub type EvalEnv = FrameStack<FrameSkip<DuelEnv>>;

/// Constructs the agent trained on each [`EnvVariant`].
///
/// The agent is trained on [`TrainEnv`] and evaluated on an [`EvalEnv`] of the
/// same enemy with unweighted rewards.
pub trait AgentBuilder {
    /// The agent.
    type Agent: Agent<TrainEnv> + Policy<EvalEnv>;

    /// Name of the algorithm, used as a directory name.
    fn algorithm(&self) -> &str;

    /// Builds a fresh agent for `variant`.
    fn build(&self, variant: &EnvVariant, seed: u64) -> Result<Self::Agent>;
}

/// Configuration of [`RandomAgent`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RandomAgentConfig {
    /// Unnormalized probabilities of the actions, in the order of [`DuelAct::ALL`].
    pub action_weights: Vec<f32>,
}

impl Default for RandomAgentConfig {
    fn default() -> Self {
        Self {
            action_weights: vec![1.0; DuelAct::N],
        }
    }
}

impl RandomAgentConfig {
    /// Sets the unnormalized probabilities of the actions.
    pub fn action_weights(mut self, v: Vec<f32>) -> Self {
        self.action_weights = v;
        self
    }

    /// Checks the action weights.
    pub fn validate(&self) -> Result<()> {
        if self.action_weights.len() != DuelAct::N {
            bail!(
                "Expected {} action weights, got {}",
                DuelAct::N,
                self.action_weights.len()
            );
        }
        if self.action_weights.iter().any(|&w| w.is_nan() || w < 0.0) {
            bail!("Action weights must be non-negative");
        }
        if self.action_weights.iter().sum::<f32>() <= 0.0 {
            bail!("At least one action weight must be positive");
        }
        Ok(())
    }
}

/// Parameters of [`RandomAgent`] saved in a checkpoint.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct RandomAgentParams {
    action_weights: Vec<f32>,
    n_opts: usize,
}

/// Baseline agent taking actions at random.
///
/// Actions are sampled with fixed probabilities; the deterministic policy takes
/// the most probable action. Optimization steps are only counted.
pub struct RandomAgent {
    action_weights: Vec<f32>,
    rng: fastrand::Rng,
    n_opts: usize,
    train: bool,
}

impl RandomAgent {
    /// Constructs the agent.
    pub fn build(config: RandomAgentConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            action_weights: config.action_weights,
            rng: fastrand::Rng::with_seed(seed),
            n_opts: 0,
            train: false,
        })
    }

    /// The number of optimization steps so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    fn most_probable(&self) -> DuelAct {
        let mut best = 0;
        for (i, &w) in self.action_weights.iter().enumerate() {
            if w > self.action_weights[best] {
                best = i;
            }
        }
        DuelAct::ALL[best]
    }

    fn sample_act(&mut self) -> DuelAct {
        let total = self.action_weights.iter().sum::<f32>();
        let mut u = self.rng.f32() * total;
        let mut last = 0;
        for (i, &w) in self.action_weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if u < w {
                return DuelAct::ALL[i];
            }
            u -= w;
            last = i;
        }
        // Rounding left `u` slightly above the last positive weight.
        DuelAct::ALL[last]
    }
}

impl<E: Env<Act = DuelAct>> Policy<E> for RandomAgent {
    fn predict(&mut self, _obs: &E::Obs, deterministic: bool) -> DuelAct {
        if deterministic {
            self.most_probable()
        } else {
            self.sample_act()
        }
    }
}

impl<E: Env<Act = DuelAct>> Agent<E> for RandomAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn observe(&mut self, _step: &Step<E>) {}

    fn opt_with_record(&mut self) -> Record {
        self.n_opts += 1;
        Record::from_scalar("n_opts", self.n_opts as f32)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        let params = RandomAgentParams {
            action_weights: self.action_weights.clone(),
            n_opts: self.n_opts,
        };
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&params)?.as_bytes())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let params: RandomAgentParams = serde_yaml::from_reader(BufReader::new(file))?;
        RandomAgentConfig::default()
            .action_weights(params.action_weights.clone())
            .validate()?;
        self.action_weights = params.action_weights;
        self.n_opts = params.n_opts;
        Ok(())
    }
}

/// Builds [`RandomAgent`]s with the same configuration for every variant.
#[derive(Debug, Clone, Default)]
pub struct RandomAgentBuilder {
    config: RandomAgentConfig,
}

impl RandomAgentBuilder {
    /// Constructs the builder.
    pub fn new(config: RandomAgentConfig) -> Self {
        Self { config }
    }
}

impl AgentBuilder for RandomAgentBuilder {
    type Agent = RandomAgent;

    fn algorithm(&self) -> &str {
        "Random"
    }

    fn build(&self, _variant: &EnvVariant, seed: u64) -> Result<RandomAgent> {
        RandomAgent::build(self.config.clone(), seed)
    }
}
