use serde::{Deserialize, Serialize};

/// Normalized control intent for one tick.
///
/// Movement axes lie in `[-1, 1]`, `vertical` is `-1`, `0` or `1`, and the
/// deltas are small rotation increments in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    pub move_forward: f32,
    pub move_right: f32,
    pub vertical: f32,
    pub yaw_delta: f32,
    pub pitch_delta: f32,
}

impl InputCommand {
    pub fn is_idle(&self) -> bool {
        *self == InputCommand::default()
    }
}
