mod config;
mod render;
use super::{DuelAct, DuelObs};
use anyhow::Result;
pub use config::DuelEnvConfig;
use image::RgbImage;
use log::trace;
use render::{draw, Scene};
use sparring_core::{record::Record, Combatants, Env, FrameSource, Health, Step};

/// Width of rendered frames.
pub const WIDTH: u32 = 160;

/// Height of rendered frames.
pub const HEIGHT: u32 = 96;

/// Life of the player and the enemy at the beginning of an episode.
pub const MAX_LIFE: f32 = 100.0;

const ARENA_WIDTH: f32 = 100.0;
const PLAYER_SPEED: f32 = 2.0;
const PLAYER_RANGE: f32 = 30.0;
const PLAYER_DAMAGE: f32 = 4.0;
const PLAYER_COOLDOWN: usize = 4;
const JUMP_STEPS: usize = 6;
const ENEMY_RETREAT_PROB: f32 = 0.2;

/// Behaviour of an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    /// Distance covered in a step.
    pub speed: f32,

    /// Damage of a shot that hits the player.
    pub damage: f32,

    /// Maximum distance of a shot.
    pub range: f32,

    /// Steps between two shots.
    pub cooldown: usize,
}

impl EnemyProfile {
    /// Profile of the enemy with the given id in `1..=8`.
    ///
    /// Later enemies are faster, hit harder from farther away and shoot more often.
    pub fn of(enemy: u8) -> Self {
        let k = enemy.clamp(1, 8);
        let kf = k as f32;
        Self {
            speed: 0.5 + 0.15 * kf,
            damage: 2.0 + 0.5 * kf,
            range: 20.0 + 2.0 * kf,
            cooldown: 12 - k as usize,
        }
    }
}

/// Duel between the player and an enemy.
pub struct DuelEnv {
    config: DuelEnvConfig,
    profile: EnemyProfile,
    rng: fastrand::Rng,

    // Positions in the arena
    player_x: f32,
    enemy_x: f32,

    player_life: f32,
    enemy_life: f32,

    // Steps until the player or the enemy can shoot again
    player_cooldown: usize,
    enemy_cooldown: usize,

    // Remaining steps in the air
    jump_left: usize,

    // Steps in the current episode
    t: usize,

    keep_frames: bool,
    frames: Vec<RgbImage>,
}

impl DuelEnv {
    /// Returns the configuration.
    pub fn config(&self) -> &DuelEnvConfig {
        &self.config
    }

    /// Returns the profile of the enemy.
    pub fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    /// Reward collected for beating the enemy from full life without taking damage.
    pub fn win_value(&self) -> f64 {
        self.config.win_value()
    }

    fn observe(&self) -> DuelObs {
        let dist = self.enemy_x - self.player_x;
        DuelObs(vec![
            self.player_x / ARENA_WIDTH,
            self.enemy_x / ARENA_WIDTH,
            dist / ARENA_WIDTH,
            self.player_life / MAX_LIFE,
            self.enemy_life / MAX_LIFE,
            self.player_cooldown as f32 / PLAYER_COOLDOWN as f32,
            self.jump_left as f32 / JUMP_STEPS as f32,
        ])
    }

    fn render(&self) -> RgbImage {
        let scene = Scene {
            player_x: self.player_x / ARENA_WIDTH,
            enemy_x: self.enemy_x / ARENA_WIDTH,
            player_life: self.player_life / MAX_LIFE,
            enemy_life: self.enemy_life / MAX_LIFE,
            player_in_air: self.jump_left > 0,
        };
        draw(&scene, WIDTH, HEIGHT)
    }

    fn push_frame(&mut self) {
        if self.keep_frames {
            let frame = self.render();
            self.frames.push(frame);
        }
    }

    /// Applies the action of the player, returns the damage dealt to the enemy.
    fn player_acts(&mut self, a: &DuelAct) -> f32 {
        match a {
            DuelAct::Idle => {}
            DuelAct::Left => self.player_x -= PLAYER_SPEED,
            DuelAct::Right => self.player_x += PLAYER_SPEED,
            DuelAct::Jump => {
                if self.jump_left == 0 {
                    self.jump_left = JUMP_STEPS;
                }
            }
            DuelAct::Shoot => {
                if self.player_cooldown == 0 {
                    self.player_cooldown = PLAYER_COOLDOWN;
                    if (self.enemy_x - self.player_x).abs() <= PLAYER_RANGE {
                        let dealt = PLAYER_DAMAGE.min(self.enemy_life);
                        self.enemy_life -= dealt;
                        return dealt;
                    }
                }
            }
        }
        self.player_x = self.player_x.clamp(0.0, ARENA_WIDTH);
        0.0
    }

    /// Moves the enemy and lets it shoot, returns the damage taken by the player.
    fn enemy_acts(&mut self) -> f32 {
        let toward = (self.player_x - self.enemy_x).signum();
        let dir = if self.rng.f32() < ENEMY_RETREAT_PROB {
            -toward
        } else {
            toward
        };
        self.enemy_x = (self.enemy_x + dir * self.profile.speed).clamp(0.0, ARENA_WIDTH);

        if self.enemy_cooldown > 0 || (self.enemy_x - self.player_x).abs() > self.profile.range {
            return 0.0;
        }
        self.enemy_cooldown = self.profile.cooldown;
        if self.jump_left > 0 {
            return 0.0;
        }
        let taken = self.profile.damage.min(self.player_life);
        self.player_life -= taken;
        taken
    }
}

impl Env for DuelEnv {
    type Config = DuelEnvConfig;
    type Obs = DuelObs;
    type Act = DuelAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            profile: EnemyProfile::of(config.enemy),
            rng: fastrand::Rng::with_seed(seed as u64),
            player_x: 0.0,
            enemy_x: 0.0,
            player_life: MAX_LIFE,
            enemy_life: MAX_LIFE,
            player_cooldown: 0,
            enemy_cooldown: 0,
            jump_left: 0,
            t: 0,
            keep_frames: false,
            frames: vec![],
        })
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized,
    {
        self.t += 1;
        self.player_cooldown = self.player_cooldown.saturating_sub(1);
        self.enemy_cooldown = self.enemy_cooldown.saturating_sub(1);

        let dealt = self.player_acts(act);
        let taken = if self.enemy_life > 0.0 {
            self.enemy_acts()
        } else {
            0.0
        };
        self.jump_left = self.jump_left.saturating_sub(1);

        let reward = (self.config.weight_enemy_hitpoint * dealt as f64
            - self.config.weight_player_hitpoint * taken as f64) as f32;
        let is_terminated = self.player_life <= 0.0 || self.enemy_life <= 0.0;
        let is_truncated = !is_terminated && self.t >= self.config.time_limit;
        if is_terminated {
            trace!(
                "Episode terminated at step {}, lives ({}, {})",
                self.t,
                self.player_life,
                self.enemy_life
            );
        }
        self.push_frame();

        let step = Step::new(self.observe(), *act, reward, is_terminated, is_truncated, ());
        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let (player_x, enemy_x) = if self.config.randomini {
            (10.0 + 30.0 * self.rng.f32(), 60.0 + 30.0 * self.rng.f32())
        } else {
            (20.0, 80.0)
        };
        self.player_x = player_x;
        self.enemy_x = enemy_x;
        self.player_life = MAX_LIFE;
        self.enemy_life = MAX_LIFE;
        self.player_cooldown = 0;
        self.enemy_cooldown = self.profile.cooldown;
        self.jump_left = 0;
        self.t = 0;
        self.push_frame();
        Ok(self.observe())
    }
}

impl Combatants for DuelEnv {
    fn read_health(&self) -> Health {
        Health {
            agent: self.player_life,
            opponent: self.enemy_life,
        }
    }
}

impl FrameSource for DuelEnv {
    fn set_frame_retention(&mut self, keep: bool) {
        self.keep_frames = keep;
        if !keep {
            self.frames.clear();
        }
    }

    fn is_retaining_frames(&self) -> bool {
        self.keep_frames
    }

    fn take_frames(&mut self) -> Vec<RgbImage> {
        std::mem::take(&mut self.frames)
    }

    fn frame_size(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }
}
