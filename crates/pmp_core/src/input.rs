//! The frame-scoped input snapshot the game core consumes.
//!
//! The simulation never looks at keys or devices. Each frame the presentation
//! layer folds whatever it reads into a [`FrameInput`] and hands it to the
//! world; replays build the same values from JSON.

/// Everything the simulation needs from the player for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Horizontal intent; only the sign is used (-1 left, +1 right, 0 idle).
    pub move_x: f32,
    pub jump: bool,
    /// Held "down": fall through jump-through platforms.
    pub drop: bool,
    /// Kill the player and restart the run from the spawn point.
    pub restart: bool,
}

impl FrameInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(move_x: f32) -> Self {
        Self {
            move_x,
            ..Self::default()
        }
    }

    pub fn wants_left(&self) -> bool {
        self.move_x < 0.0
    }

    pub fn wants_right(&self) -> bool {
        self.move_x > 0.0
    }
}
