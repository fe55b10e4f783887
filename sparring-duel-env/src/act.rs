//! Action for [`DuelEnv`](crate::DuelEnv).
use sparring_core::Act;

/// Action of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelAct {
    /// Do nothing.
    Idle,

    /// Move to the left.
    Left,

    /// Move to the right.
    Right,

    /// Shoot at the enemy.
    Shoot,

    /// Jump, dodging enemy shots while in the air.
    Jump,
}

impl DuelAct {
    /// The number of actions.
    pub const N: usize = 5;

    /// All actions, in the order of their indices.
    pub const ALL: [DuelAct; Self::N] = [
        DuelAct::Idle,
        DuelAct::Left,
        DuelAct::Right,
        DuelAct::Shoot,
        DuelAct::Jump,
    ];

    /// Index of the action.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|a| a == self).unwrap_or(0)
    }
}

impl Act for DuelAct {}

impl From<u8> for DuelAct {
    /// Out-of-range indices are [`DuelAct::Idle`].
    fn from(ix: u8) -> Self {
        Self::ALL.get(ix as usize).copied().unwrap_or(DuelAct::Idle)
    }
}
