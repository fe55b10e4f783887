//! Capabilities an evaluation environment exposes to the scheduler.
use image::RgbImage;

/// Health of the two simulated entities of a duel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    /// Health of the entity controlled by the agent.
    pub agent: f32,

    /// Health of the opponent.
    pub opponent: f32,
}

impl Health {
    /// `true` if the opponent has no health left.
    pub fn is_win(&self) -> bool {
        self.opponent <= 0.0
    }
}

/// An environment with an agent-controlled entity fighting an opponent.
pub trait Combatants {
    /// Returns the current health of both entities.
    fn read_health(&self) -> Health;
}

/// An environment that can keep rendered frames of an episode.
pub trait FrameSource {
    /// Turns retention of rendered frames on or off.
    ///
    /// Turning it off drops frames retained so far.
    fn set_frame_retention(&mut self, keep: bool);

    /// Returns `true` if frames are currently retained.
    fn is_retaining_frames(&self) -> bool;

    /// Takes the frames retained since retention was turned on or since the last call.
    fn take_frames(&mut self) -> Vec<RgbImage>;

    /// Width and height of rendered frames in pixels.
    fn frame_size(&self) -> (u32, u32);
}
