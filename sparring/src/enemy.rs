use crate::ExperimentError;

/// Names of the enemies, indexed by `id - 1`.
pub const ENEMY_NAMES: [&str; 8] = [
    "FlashMan",
    "AirMan",
    "WoodMan",
    "HeatMan",
    "MetalMan",
    "CrashMan",
    "BubbleMan",
    "QuickMan",
];

/// Returns the name of the enemy with the given id in `1..=8`.
pub fn enemy_name(id: u8) -> Result<&'static str, ExperimentError> {
    (id as usize)
        .checked_sub(1)
        .and_then(|ix| ENEMY_NAMES.get(ix))
        .copied()
        .ok_or(ExperimentError::UnknownEnemy(id))
}
