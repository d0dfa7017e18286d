//! A world bound to a level on disk.
//!
//! Play sessions run until every collectable is eaten, then record the time
//! and campaign progress. Editor sessions switch between editing and
//! play-testing and can save the design; they never complete.

use std::path::PathBuf;

use pmp_core::input::FrameInput;

use crate::config::GameConfig;
use crate::editor::Editor;
use crate::level::{self, LevelData, LevelError};
use crate::store::LevelStore;
use crate::world::{FrameReport, WorldState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelId {
    BuiltIn(u32),
    Custom(String),
    /// Created in the editor and never saved.
    Unsaved,
}

impl LevelId {
    pub fn dir(&self, store: &LevelStore) -> Option<PathBuf> {
        match self {
            LevelId::BuiltIn(number) => Some(store.built_in_dir(*number)),
            LevelId::Custom(name) => Some(store.custom_dir(name)),
            LevelId::Unsaved => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Play,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Play,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Edit mode frame; the world did not advance.
    Editing,
    Frame(FrameReport),
    LevelComplete {
        seconds: f64,
        new_best: bool,
        progress_advanced: bool,
        /// False when the personal best or progress could not be written.
        recorded: bool,
    },
    /// The level was already completed; nothing more happens.
    Finished,
}

pub struct Session {
    pub world: WorldState,
    pub editor: Editor,
    store: LevelStore,
    level: LevelId,
    kind: SessionKind,
    mode: Mode,
    /// Design saved when play-testing starts, restored when editing resumes.
    design: Option<LevelData>,
    complete: bool,
}

impl Session {
    pub fn open(
        store: LevelStore,
        level: LevelId,
        kind: SessionKind,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, LevelError> {
        let data = match level.dir(&store) {
            Some(dir) => level::load_level(&dir)?,
            None => LevelData::default(),
        };
        let mut world = WorldState::from_level(data, config, seed);
        let mode = match kind {
            SessionKind::Play => Mode::Play,
            SessionKind::Editor => Mode::Edit,
        };
        world.camera_follow = mode == Mode::Play;
        log::info!("Opened {level:?} for {kind:?}");

        Ok(Self {
            world,
            editor: Editor::new(),
            store,
            level,
            kind,
            mode,
            design: None,
            complete: false,
        })
    }

    pub fn level(&self) -> &LevelId {
        &self.level
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn store(&self) -> &LevelStore {
        &self.store
    }

    pub fn step(&mut self, input: &FrameInput) -> SessionEvent {
        if self.complete {
            return SessionEvent::Finished;
        }
        if self.mode == Mode::Edit {
            self.editor.tick();
            return SessionEvent::Editing;
        }

        let report = self.world.step(input);
        if self.kind == SessionKind::Play && report.won {
            return self.complete_level();
        }
        SessionEvent::Frame(report)
    }

    fn complete_level(&mut self) -> SessionEvent {
        self.complete = true;
        let seconds = self.world.timer().elapsed_centiseconds_rounded();

        let mut recorded = true;
        let new_best = match self.level.dir(&self.store) {
            Some(dir) => match self.store.update_personal_best(&dir, seconds) {
                Ok(improved) => improved,
                Err(err) => {
                    log::error!("Failed to record personal best: {err}");
                    recorded = false;
                    false
                }
            },
            None => false,
        };
        let progress_advanced = match self.level {
            LevelId::BuiltIn(number) => match self.store.record_completion(number) {
                Ok(advanced) => advanced,
                Err(err) => {
                    log::error!("Failed to record progress: {err}");
                    recorded = false;
                    false
                }
            },
            _ => false,
        };

        log::info!("Level {:?} complete in {seconds:.2}s", self.level);
        SessionEvent::LevelComplete {
            seconds,
            new_best,
            progress_advanced,
            recorded,
        }
    }

    /// Switch an editor session between editing and play-testing. Play
    /// sessions stay in play mode.
    pub fn toggle_mode(&mut self) -> Mode {
        if self.kind == SessionKind::Play {
            return self.mode;
        }
        match self.mode {
            Mode::Edit => {
                let design = self.world.to_level_data();
                self.world.load_level(design.clone());
                self.design = Some(design);
                self.world.camera_follow = true;
                self.mode = Mode::Play;
            }
            Mode::Play => {
                let scroll = self.world.scroll;
                if let Some(design) = self.design.take() {
                    self.world.load_level(design);
                }
                self.world.scroll = scroll;
                self.world.camera_follow = false;
                self.editor.reset();
                self.mode = Mode::Edit;
            }
        }
        log::debug!("Editor switched to {:?}", self.mode);
        self.mode
    }

    /// Write the design to disk and return the level's name. The personal
    /// best is reset because the geometry may have changed. Unsaved levels
    /// get the next free `unnamedN`.
    pub fn save(&mut self) -> Result<String, LevelError> {
        let mut data = match (&self.design, self.mode) {
            (Some(design), Mode::Play) => design.clone(),
            _ => self.world.to_level_data(),
        };
        data.personal_best = None;

        let name = match self.level.clone() {
            LevelId::BuiltIn(number) => {
                level::save_level(&self.store.built_in_dir(number), &data)?;
                format!("level{number}")
            }
            LevelId::Custom(name) => self.store.save_custom(Some(&name), &data)?,
            LevelId::Unsaved => {
                let name = self.store.save_custom(None, &data)?;
                self.level = LevelId::Custom(name.clone());
                name
            }
        };
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Tool;
    use crate::entity::{Collectable, GhostColor, Platform, PlatformKind, Spike};
    use crate::ghost::Ghost;
    use glam::Vec2;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pmp_session_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn quick_win_level(collectable_x: f32) -> LevelData {
        LevelData {
            start: Vec2::new(100.0, 450.0),
            platforms: vec![Platform::new(PlatformKind::Platform, 0.0, 500.0, 1000.0, 20.0)],
            collectables: vec![Collectable::new(collectable_x, 480.0)],
            ..LevelData::default()
        }
    }

    fn run_until_complete(session: &mut Session) -> SessionEvent {
        for _ in 0..600 {
            let event = session.step(&FrameInput::moving(1.0));
            if matches!(event, SessionEvent::LevelComplete { .. }) {
                return event;
            }
        }
        panic!("level never completed");
    }

    #[test]
    fn completing_built_in_level_records_best_and_progress() {
        let root = temp_root("complete");
        let store = LevelStore::new(&root);
        level::save_level(&store.built_in_dir(1), &quick_win_level(300.0)).expect("save");

        let mut session = Session::open(
            store.clone(),
            LevelId::BuiltIn(1),
            SessionKind::Play,
            GameConfig::default(),
            1,
        )
        .expect("open");
        let event = run_until_complete(&mut session);
        let SessionEvent::LevelComplete {
            seconds,
            new_best,
            progress_advanced,
            recorded,
        } = event
        else {
            unreachable!()
        };
        assert!(seconds > 0.0);
        assert!(recorded);
        assert!(new_best);
        assert!(progress_advanced);
        assert_eq!(store.progress().expect("progress"), 1);
        assert_eq!(
            store.personal_best(&store.built_in_dir(1)).expect("pb"),
            Some(seconds)
        );
        assert_eq!(session.step(&FrameInput::idle()), SessionEvent::Finished);

        // A second, identical run neither beats the time nor moves progress.
        let mut again = Session::open(
            store.clone(),
            LevelId::BuiltIn(1),
            SessionKind::Play,
            GameConfig::default(),
            1,
        )
        .expect("open");
        assert_eq!(
            run_until_complete(&mut again),
            SessionEvent::LevelComplete {
                seconds,
                new_best: false,
                progress_advanced: false,
                recorded: true,
            }
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn unwritable_progress_is_reported_on_completion() {
        let root = temp_root("unwritable");
        let store = LevelStore::new(&root);
        level::save_level(&store.built_in_dir(1), &quick_win_level(300.0)).expect("save");

        let mut session = Session::open(
            store.clone(),
            LevelId::BuiltIn(1),
            SessionKind::Play,
            GameConfig::default(),
            1,
        )
        .expect("open");
        fs::write(root.join(crate::store::PROGRESS_FILE), "three").expect("write");

        let SessionEvent::LevelComplete {
            new_best,
            progress_advanced,
            recorded,
            ..
        } = run_until_complete(&mut session)
        else {
            unreachable!()
        };
        assert!(new_best);
        assert!(!progress_advanced);
        assert!(!recorded);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn editor_sessions_never_complete() {
        let root = temp_root("editor_win");
        let store = LevelStore::new(&root);
        let mut session = Session::open(
            store,
            LevelId::Unsaved,
            SessionKind::Editor,
            GameConfig::default(),
            1,
        )
        .expect("open");
        assert_eq!(session.step(&FrameInput::idle()), SessionEvent::Editing);
        assert_eq!(session.toggle_mode(), Mode::Play);
        for _ in 0..10 {
            assert!(matches!(
                session.step(&FrameInput::idle()),
                SessionEvent::Frame(_)
            ));
        }
        assert!(!session.is_complete());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn play_testing_does_not_disturb_the_design() {
        let root = temp_root("playtest");
        let store = LevelStore::new(&root);
        let mut session = Session::open(
            store.clone(),
            LevelId::Unsaved,
            SessionKind::Editor,
            GameConfig::default(),
            1,
        )
        .expect("open");
        let mut design = quick_win_level(900.0);
        design.start = Vec2::new(800.0, 450.0);
        design.ghosts.push(Ghost::new(Vec2::new(100.0, 450.0), GhostColor::Orange));
        design.spikes.push(Spike::new(200.0, 500.0, 1, false));
        session.world.load_level(design);
        session.editor.select(Tool::Ghost);

        session.toggle_mode();
        for _ in 0..200 {
            session.step(&FrameInput::idle());
        }
        assert!(session.world.ghosts.is_empty());

        let name = session.save().expect("save during play-test");
        assert_eq!(name, "unnamed1");
        assert_eq!(session.level(), &LevelId::Custom("unnamed1".to_string()));

        assert_eq!(session.toggle_mode(), Mode::Edit);
        assert_eq!(session.editor.tool, Tool::Platform);
        assert_eq!(session.world.ghosts.len(), 1);
        assert_eq!(session.world.ghosts[0].pos, Vec2::new(100.0, 450.0));

        let saved = level::load_level(&store.custom_dir("unnamed1")).expect("load");
        assert_eq!(saved.ghosts.len(), 1);
        assert_eq!(saved.personal_best, None);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn saving_resets_personal_best() {
        let root = temp_root("save_pb");
        let store = LevelStore::new(&root);
        store
            .save_custom(Some("tower"), &quick_win_level(300.0))
            .expect("save");
        store
            .update_personal_best(&store.custom_dir("tower"), 8.5)
            .expect("pb");

        let mut session = Session::open(
            store.clone(),
            LevelId::Custom("tower".to_string()),
            SessionKind::Editor,
            GameConfig::default(),
            1,
        )
        .expect("open");
        session.save().expect("save");
        assert_eq!(
            store.personal_best(&store.custom_dir("tower")).expect("pb"),
            None
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn opening_malformed_level_fails() {
        let root = temp_root("malformed");
        let store = LevelStore::new(&root);
        let dir = store.custom_dir("broken");
        fs::create_dir_all(&dir).expect("create");
        fs::write(dir.join("ghost.txt"), "1 2\n").expect("write");

        let result = Session::open(
            store,
            LevelId::Custom("broken".to_string()),
            SessionKind::Play,
            GameConfig::default(),
            1,
        );
        assert!(matches!(result, Err(LevelError::Malformed { .. })));

        let _ = fs::remove_dir_all(root);
    }
}
