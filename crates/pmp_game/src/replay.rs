use pmp_core::input::FrameInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub drop: bool,
    #[serde(default)]
    pub restart: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    fn input(&self) -> FrameInput {
        FrameInput {
            move_x: self.move_x.clamp(-1.0, 1.0),
            jump: self.jump,
            drop: self.drop,
            restart: self.restart,
        }
    }
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<FrameInput> {
        self.frames
            .iter()
            .flat_map(|frame| std::iter::repeat(frame.input()).take(frame.repeat.max(1) as usize))
            .collect()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    if let Some(index) = replay.frames.iter().position(|f| !f.move_x.is_finite()) {
        return Err(format!(
            "Replay validation failed: frame {index} has a non-finite move_x"
        ));
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::entity::{Collectable, GhostColor, Platform, PlatformKind, Spike};
    use crate::ghost::Ghost;
    use crate::level::LevelData;
    use crate::moving_platform::MovingPlatform;
    use crate::world::WorldState;
    use glam::Vec2;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pmp_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn busy_level() -> LevelData {
        LevelData {
            start: Vec2::new(100.0, 400.0),
            platforms: vec![
                Platform::new(PlatformKind::Platform, 0.0, 500.0, 1200.0, 20.0),
                Platform::new(PlatformKind::Bouncy, 400.0, 480.0, 100.0, 20.0),
                Platform::new(PlatformKind::JumpThrough, 600.0, 380.0, 150.0, 14.0),
            ],
            spikes: vec![Spike::new(900.0, 500.0, 3, false)],
            moving_platforms: vec![MovingPlatform::new(
                Vec2::new(200.0, 300.0),
                Vec2::new(500.0, 200.0),
                100.0,
                14.0,
                3.0,
            )],
            collectables: vec![Collectable::new(300.0, 470.0), Collectable::new(700.0, 350.0)],
            ghosts: vec![Ghost::new(Vec2::new(1000.0, 450.0), GhostColor::Blue)],
            ..LevelData::default()
        }
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "move_x": 3.0, "repeat": 3 },
                { "jump": true },
                { "drop": true, "restart": true, "repeat": 0 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert_eq!(expanded[0].move_x, 1.0);
        assert!(expanded[3].jump);
        assert!(expanded[4].drop && expanded[4].restart);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "move_x": 1.0, "repeat": 60 },
                { "move_x": 1.0, "jump": true, "repeat": 1 },
                { "move_x": 1.0, "repeat": 120 },
                { "move_x": -1.0, "drop": true, "repeat": 45 },
                { "restart": true },
                { "move_x": 1.0, "repeat": 200 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();

        let run = || {
            let mut world = WorldState::from_level(busy_level(), GameConfig::default(), 7);
            let mut deaths = 0;
            for input in &inputs {
                if world.step(input).player_died {
                    deaths += 1;
                }
            }
            (
                world.player.clone(),
                world.scroll,
                world.score,
                world.ghosts.len(),
                world.moving_platforms[0].pos,
                deaths,
            )
        };

        let first = run();
        assert_eq!(first, run());
        assert!(first.5 >= 1);

        let _ = fs::remove_file(path);
    }
}
