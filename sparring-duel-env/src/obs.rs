use sparring_core::{Obs, VecObs};

/// Observation of [`DuelEnv`](crate::DuelEnv).
///
/// Positions, distance, lives, the shot cooldown of the player and the
/// remaining jump time, all scaled to about `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DuelObs(pub Vec<f32>);

impl DuelObs {
    /// Dimension of the observation of a single step.
    pub const DIM: usize = 7;
}

impl Obs for DuelObs {}

impl VecObs for DuelObs {
    fn features(&self) -> &[f32] {
        &self.0
    }

    fn from_features(features: Vec<f32>) -> Self {
        Self(features)
    }
}

impl From<DuelObs> for Vec<f32> {
    fn from(obs: DuelObs) -> Self {
        obs.0
    }
}
