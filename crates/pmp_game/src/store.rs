//! The `game_data` root: built-in levels, custom levels and campaign progress.
//!
//! ```text
//! game_data/
//!   progress.txt        highest completed built-in level
//!   built_in/level1/ …  shipped levels
//!   custom/<name>/      user levels
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::level::{self, write_atomic, LevelData, LevelError};

pub const PROGRESS_FILE: &str = "progress.txt";
const BUILT_IN_DIR: &str = "built_in";
const CUSTOM_DIR: &str = "custom";
const UNNAMED_PREFIX: &str = "unnamed";

#[derive(Debug, Clone)]
pub struct LevelStore {
    root: PathBuf,
}

impl LevelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn built_in_dir(&self, number: u32) -> PathBuf {
        self.root.join(BUILT_IN_DIR).join(format!("level{number}"))
    }

    pub fn custom_root(&self) -> PathBuf {
        self.root.join(CUSTOM_DIR)
    }

    pub fn custom_dir(&self, name: &str) -> PathBuf {
        self.custom_root().join(name)
    }

    /// Number of consecutive `levelN` directories starting at 1.
    pub fn built_in_count(&self) -> u32 {
        let mut count = 0;
        while self.built_in_dir(count + 1).is_dir() {
            count += 1;
        }
        count
    }

    /// Highest completed built-in level, 0 when nothing is completed.
    pub fn progress(&self) -> Result<u32, LevelError> {
        let path = self.root.join(PROGRESS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} missing, no progress yet", path.display());
                return Ok(0);
            }
            Err(err) => return Err(LevelError::io(&path, err)),
        };
        let token = raw.trim();
        if token.is_empty() {
            return Ok(0);
        }
        token.parse::<u32>().map_err(|_| LevelError::Malformed {
            path,
            line: 1,
            reason: format!("progress must be a whole number, found '{token}'"),
        })
    }

    pub fn is_unlocked(&self, number: u32) -> Result<bool, LevelError> {
        Ok(number <= self.progress()? + 1)
    }

    /// Mark built-in level `number` complete. Progress never goes backwards.
    /// Returns whether the stored value changed.
    pub fn record_completion(&self, number: u32) -> Result<bool, LevelError> {
        let current = self.progress()?;
        if number <= current {
            return Ok(false);
        }
        fs::create_dir_all(&self.root).map_err(|e| LevelError::io(&self.root, e))?;
        write_atomic(&self.root.join(PROGRESS_FILE), &format!("{number}\n"))?;
        log::info!("Progress advanced to level {number}");
        Ok(true)
    }

    /// Custom level names, sorted.
    pub fn list_custom(&self) -> Result<Vec<String>, LevelError> {
        let root = self.custom_root();
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(LevelError::io(&root, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LevelError::io(&root, e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create an empty directory under `custom/` named `unnamedN`, using the
    /// lowest N (from 1) not already taken.
    pub fn create_unnamed(&self) -> Result<String, LevelError> {
        let root = self.custom_root();
        fs::create_dir_all(&root).map_err(|e| LevelError::io(&root, e))?;

        let mut number = 1u32;
        loop {
            let name = format!("{UNNAMED_PREFIX}{number}");
            let dir = root.join(&name);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    log::info!("Created custom level {name}");
                    return Ok(name);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => number += 1,
                Err(err) => return Err(LevelError::io(&dir, err)),
            }
        }
    }

    /// Save `level` as a custom level, allocating a fresh name when `name` is `None`.
    pub fn save_custom(&self, name: Option<&str>, level: &LevelData) -> Result<String, LevelError> {
        let name = match name {
            Some(name) => {
                check_name(name, &self.custom_dir(name))?;
                name.to_string()
            }
            None => self.create_unnamed()?,
        };
        level::save_level(&self.custom_dir(&name), level)?;
        Ok(name)
    }

    pub fn delete_custom(&self, name: &str) -> Result<(), LevelError> {
        let dir = self.custom_dir(name);
        check_name(name, &dir)?;
        fs::remove_dir_all(&dir).map_err(|e| LevelError::io(&dir, e))?;
        log::info!("Deleted custom level {name}");
        Ok(())
    }

    pub fn personal_best(&self, dir: &Path) -> Result<Option<f64>, LevelError> {
        level::personal_best(dir)
    }

    pub fn update_personal_best(&self, dir: &Path, seconds: f64) -> Result<bool, LevelError> {
        level::update_personal_best(dir, seconds)
    }
}

/// Custom level names are single path components.
fn check_name(name: &str, dir: &Path) -> Result<(), LevelError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(LevelError::io(
            dir,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid level name '{name}'"),
            ),
        ))
    }
}
