//! Engine-agnostic building blocks shared by the game crate: the per-frame
//! input snapshot and the deterministic run timer.

pub mod input;
pub mod time;
