//! Scripted environment, agent and listener used in tests.
//!
//! [`ScriptedEnv`] terminates after a fixed number of steps (or never), reports
//! scripted opponent health at the end of each episode and renders flat frames
//! whose gray level is the step index.
use crate::{
    record::Record, Act, Agent, Combatants, Env, FrameSource, Health, Obs, Policy, Step,
    TrainingListener,
};
use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use std::{fs, path::Path};

/// Observation of [`ScriptedEnv`]: the step index in the current episode.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedObs(pub usize);

impl Obs for ScriptedObs {}

/// Action of [`ScriptedEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedAct(pub i32);

impl Act for ScriptedAct {}

/// Configuration of [`ScriptedEnv`].
#[derive(Clone, Debug)]
pub struct ScriptedEnvConfig {
    /// Steps until termination, `None` for an episode that never ends.
    pub episode_len: Option<usize>,

    /// Reward given at every step.
    pub reward_per_step: f32,

    /// Opponent health at the end of the episodes, cycled over episodes.
    pub opponent_health_at_end: Vec<f32>,

    /// Steps added to `episode_len` at every reset after the first.
    pub length_growth: usize,

    /// Frame width and height.
    pub frame_size: (u32, u32),
}

impl Default for ScriptedEnvConfig {
    fn default() -> Self {
        Self {
            episode_len: Some(10),
            reward_per_step: 1.0,
            opponent_health_at_end: vec![0.0],
            length_growth: 0,
            frame_size: (8, 6),
        }
    }
}

impl ScriptedEnvConfig {
    /// Sets the episode length.
    pub fn episode_len(mut self, v: usize) -> Self {
        self.episode_len = Some(v);
        self
    }

    /// Episodes never terminate.
    pub fn never_done(mut self) -> Self {
        self.episode_len = None;
        self
    }

    /// Sets the reward given at every step.
    pub fn reward_per_step(mut self, v: f32) -> Self {
        self.reward_per_step = v;
        self
    }

    /// Episodes get longer by `v` steps at every reset.
    pub fn length_growth(mut self, v: usize) -> Self {
        self.length_growth = v;
        self
    }

    /// Sets the opponent health at the end of the episodes.
    pub fn opponent_health_at_end(mut self, v: Vec<f32>) -> Self {
        self.opponent_health_at_end = v;
        self
    }
}

/// Scripted environment.
pub struct ScriptedEnv {
    config: ScriptedEnvConfig,
    t: usize,
    n_resets: usize,
    opponent_health: f32,
    retaining: bool,
    frames: Vec<RgbImage>,
}

impl ScriptedEnv {
    /// Number of resets so far.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    fn render(&self) -> RgbImage {
        let (w, h) = self.config.frame_size;
        let v = (self.t % 256) as u8;
        RgbImage::from_pixel(w, h, Rgb([v, v, v]))
    }
}

impl Env for ScriptedEnv {
    type Config = ScriptedEnvConfig;
    type Obs = ScriptedObs;
    type Act = ScriptedAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        if config.opponent_health_at_end.is_empty() {
            bail!("opponent_health_at_end must not be empty");
        }
        Ok(Self {
            config: config.clone(),
            t: 0,
            n_resets: 0,
            opponent_health: 100.0,
            retaining: false,
            frames: vec![],
        })
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        self.t += 1;
        let growth = self.config.length_growth * self.n_resets.saturating_sub(1);
        let is_terminated = matches!(self.config.episode_len, Some(n) if self.t >= n + growth);
        if is_terminated {
            let healths = &self.config.opponent_health_at_end;
            self.opponent_health = healths[self.n_resets.saturating_sub(1) % healths.len()];
        }
        if self.retaining {
            let frame = self.render();
            self.frames.push(frame);
        }
        let step = Step::new(
            ScriptedObs(self.t),
            a.clone(),
            self.config.reward_per_step,
            is_terminated,
            false,
            (),
        );
        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        self.n_resets += 1;
        self.opponent_health = 100.0;
        if self.retaining {
            let frame = self.render();
            self.frames.push(frame);
        }
        Ok(ScriptedObs(0))
    }
}

impl Combatants for ScriptedEnv {
    fn read_health(&self) -> Health {
        Health {
            agent: 100.0,
            opponent: self.opponent_health,
        }
    }
}

impl FrameSource for ScriptedEnv {
    fn set_frame_retention(&mut self, keep: bool) {
        self.retaining = keep;
        if !keep {
            self.frames.clear();
        }
    }

    fn is_retaining_frames(&self) -> bool {
        self.retaining
    }

    fn take_frames(&mut self) -> Vec<RgbImage> {
        std::mem::take(&mut self.frames)
    }

    fn frame_size(&self) -> (u32, u32) {
        self.config.frame_size
    }
}

/// Scripted agent counting calls.
#[derive(Default)]
pub struct ScriptedAgent {
    /// Steps handed to [`Agent::observe`].
    pub n_observed: usize,

    /// Optimization steps.
    pub n_opts: usize,

    /// Calls of [`Policy::predict`] with `deterministic` flags.
    pub predictions: Vec<bool>,

    /// Fail in [`Agent::save_params`].
    pub fail_save: bool,

    /// Training mode.
    pub train: bool,
}

impl<E: Env<Act = ScriptedAct>> Policy<E> for ScriptedAgent {
    fn predict(&mut self, _obs: &E::Obs, deterministic: bool) -> ScriptedAct {
        self.predictions.push(deterministic);
        ScriptedAct(0)
    }
}

impl<E: Env<Act = ScriptedAct>> Agent<E> for ScriptedAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn observe(&mut self, _step: &Step<E>) {
        self.n_observed += 1;
    }

    fn opt_with_record(&mut self) -> Record {
        self.n_opts += 1;
        Record::from_scalar("n_opts", self.n_opts as f32)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        if self.fail_save {
            bail!("scripted failure");
        }
        fs::write(path, format!("n_opts: {}\n", self.n_opts))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let _ = fs::read_to_string(path)?;
        Ok(())
    }
}

/// Listener recording the steps it is called with.
#[derive(Default)]
pub struct CountingListener {
    /// Steps passed to `on_step`.
    pub steps: Vec<usize>,

    /// Calls of `on_training_end`.
    pub n_training_end: usize,

    stop_at: Option<usize>,
}

impl CountingListener {
    /// Return `false` from `on_step` at the given step.
    pub fn stop_at(mut self, step: usize) -> Self {
        self.stop_at = Some(step);
        self
    }
}

impl<E: Env, A: Agent<E>> TrainingListener<E, A> for CountingListener {
    fn on_step(&mut self, env_steps: usize, _agent: &mut A) -> Result<bool> {
        self.steps.push(env_steps);
        Ok(self.stop_at != Some(env_steps))
    }

    fn on_training_end(&mut self, _agent: &mut A) -> Result<()> {
        self.n_training_end += 1;
        Ok(())
    }
}
