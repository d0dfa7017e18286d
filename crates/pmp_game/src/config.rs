//! Tunable constants for physics and the camera.
//!
//! Every field has a serde default, so a config file only needs to name the
//! values it overrides. Iteration bounds (`max_wall_height`,
//! `max_resolve_steps`, `max_fall_speed`) live here instead of in the physics
//! code so collision resolution can be exercised in isolation.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PhysicsConfig {
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Terminal fall speed. Matches the actor size so a single frame can never
    /// skip over a platform thicker than the actor.
    #[serde(default = "default_actor_size")]
    pub max_fall_speed: f32,
    #[serde(default = "default_jump_speed")]
    pub jump_speed: f32,
    #[serde(default = "default_bounce_speed")]
    pub bounce_speed: f32,
    /// Frames after leaving the ground during which a jump is still honoured.
    #[serde(default = "default_jump_grace_frames")]
    pub jump_grace_frames: u32,
    /// Tallest ledge an actor steps up onto while walking.
    #[serde(default = "default_max_wall_height")]
    pub max_wall_height: u32,
    /// Cap on 1-unit pushes when separating an actor from terrain.
    #[serde(default = "default_max_resolve_steps")]
    pub max_resolve_steps: u32,
    #[serde(default = "default_player_speed")]
    pub player_speed: f32,
    #[serde(default = "default_ghost_speed")]
    pub ghost_speed: f32,
    #[serde(default = "default_actor_size")]
    pub actor_size: f32,
    /// Horizontal hit-box inset on each side of the player sprite.
    #[serde(default = "default_player_inset")]
    pub player_inset: f32,
    /// World-space y of the floor line. `null` disables the floor.
    #[serde(default = "default_ground_y")]
    pub ground_y: Option<f32>,
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    #[serde(default = "default_end_pause_frames")]
    pub end_pause_frames: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            max_fall_speed: default_actor_size(),
            jump_speed: default_jump_speed(),
            bounce_speed: default_bounce_speed(),
            jump_grace_frames: default_jump_grace_frames(),
            max_wall_height: default_max_wall_height(),
            max_resolve_steps: default_max_resolve_steps(),
            player_speed: default_player_speed(),
            ghost_speed: default_ghost_speed(),
            actor_size: default_actor_size(),
            player_inset: default_player_inset(),
            ground_y: default_ground_y(),
            particle_count: default_particle_count(),
            end_pause_frames: default_end_pause_frames(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ViewConfig {
    #[serde(default = "default_view_width")]
    pub width: f32,
    #[serde(default = "default_view_height")]
    pub height: f32,
    /// Camera catches up 1/camera_lag of the distance to the player each frame.
    #[serde(default = "default_camera_lag")]
    pub camera_lag: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: default_view_width(),
            height: default_view_height(),
            camera_lag: default_camera_lag(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let physics = &config.physics;
    if physics.gravity <= 0.0 {
        return Err("Config validation failed: gravity must be > 0".to_string());
    }
    if physics.max_fall_speed <= 0.0 {
        return Err("Config validation failed: max_fall_speed must be > 0".to_string());
    }
    if physics.actor_size <= 0.0 {
        return Err("Config validation failed: actor_size must be > 0".to_string());
    }
    if physics.player_inset * 2.0 >= physics.actor_size {
        return Err(
            "Config validation failed: player_inset leaves no hit-box width".to_string(),
        );
    }
    if physics.max_resolve_steps == 0 {
        return Err("Config validation failed: max_resolve_steps must be > 0".to_string());
    }
    if config.view.width <= 0.0 || config.view.height <= 0.0 {
        return Err("Config validation failed: view dimensions must be > 0".to_string());
    }
    if config.view.camera_lag < 1.0 {
        return Err("Config validation failed: camera_lag must be >= 1".to_string());
    }
    Ok(())
}

const fn default_gravity() -> f32 {
    1.0
}

const fn default_jump_speed() -> f32 {
    15.0
}

const fn default_bounce_speed() -> f32 {
    25.0
}

const fn default_jump_grace_frames() -> u32 {
    5
}

const fn default_max_wall_height() -> u32 {
    20
}

const fn default_max_resolve_steps() -> u32 {
    256
}

const fn default_player_speed() -> f32 {
    7.0
}

const fn default_ghost_speed() -> f32 {
    3.0
}

const fn default_actor_size() -> f32 {
    50.0
}

const fn default_player_inset() -> f32 {
    5.0
}

const fn default_ground_y() -> Option<f32> {
    Some(650.0)
}

const fn default_particle_count() -> usize {
    20
}

const fn default_end_pause_frames() -> u32 {
    15
}

const fn default_view_width() -> f32 {
    1280.0
}

const fn default_view_height() -> f32 {
    720.0
}

const fn default_camera_lag() -> f32 {
    15.0
}
