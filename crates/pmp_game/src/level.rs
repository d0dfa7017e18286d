//! Level directory format.
//!
//! A level is a directory with one text file per entity type. Each non-blank
//! line is one instance: whitespace-separated numbers in a fixed order.
//!
//! | file | fields |
//! |---|---|
//! | `platform.txt`, `bouncy.txt`, `wall.txt`, `jump_through.txt` | x y length width |
//! | `spike.txt` | x y count flip |
//! | `ghost.txt` | x y colour |
//! | `collectable.txt` | x y |
//! | `moving_platform.txt` | x1 y1 x2 y2 length width speed |
//! | `data.txt` | start x, start y; then the personal best in seconds (0 = none) |
//!
//! A missing entity file is an empty collection. Anything unparseable fails
//! the whole load; no partial level is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::entity::{Collectable, GhostColor, Platform, PlatformKind, Spike};
use crate::ghost::Ghost;
use crate::moving_platform::MovingPlatform;
use crate::world::DEFAULT_START;

pub const DATA_FILE: &str = "data.txt";
pub const SPIKE_FILE: &str = "spike.txt";
pub const GHOST_FILE: &str = "ghost.txt";
pub const COLLECTABLE_FILE: &str = "collectable.txt";
pub const MOVING_PLATFORM_FILE: &str = "moving_platform.txt";

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("{}:{line}: {reason}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LevelError {
    fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Everything a level directory stores.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub start: Vec2,
    /// Best completion time in seconds; `None` when never completed.
    pub personal_best: Option<f64>,
    /// Every static platform regardless of kind.
    pub platforms: Vec<Platform>,
    pub spikes: Vec<Spike>,
    pub moving_platforms: Vec<MovingPlatform>,
    pub collectables: Vec<Collectable>,
    pub ghosts: Vec<Ghost>,
}

impl Default for LevelData {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            personal_best: None,
            platforms: Vec::new(),
            spikes: Vec::new(),
            moving_platforms: Vec::new(),
            collectables: Vec::new(),
            ghosts: Vec::new(),
        }
    }
}

impl LevelData {
    pub fn entity_count(&self) -> usize {
        self.platforms.len()
            + self.spikes.len()
            + self.moving_platforms.len()
            + self.collectables.len()
            + self.ghosts.len()
    }
}

pub fn platform_file(kind: PlatformKind) -> &'static str {
    match kind {
        PlatformKind::Platform => "platform.txt",
        PlatformKind::Bouncy => "bouncy.txt",
        PlatformKind::JumpThrough => "jump_through.txt",
        PlatformKind::Wall => "wall.txt",
    }
}

/// Start position and personal best from `data.txt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelMetadata {
    pub start: Vec2,
    pub personal_best: Option<f64>,
}

pub fn load_level(dir: &Path) -> Result<LevelData, LevelError> {
    let mut platforms = Vec::new();
    for kind in PlatformKind::ALL {
        let path = dir.join(platform_file(kind));
        for (_, fields) in read_records(&path, 4)? {
            platforms.push(Platform::new(kind, fields[0], fields[1], fields[2], fields[3]));
        }
    }

    let path = dir.join(SPIKE_FILE);
    let mut spikes = Vec::new();
    for (line, fields) in read_records(&path, 4)? {
        let count = parse_whole(&path, line, fields[2], "spike count")?;
        if count < 1 {
            return Err(LevelError::malformed(&path, line, "spike count must be at least 1"));
        }
        let flip = match parse_whole(&path, line, fields[3], "spike flip")? {
            0 => false,
            1 => true,
            other => {
                return Err(LevelError::malformed(
                    &path,
                    line,
                    format!("spike flip must be 0 or 1, found {other}"),
                ))
            }
        };
        spikes.push(Spike::new(fields[0], fields[1], count, flip));
    }

    let path = dir.join(GHOST_FILE);
    let mut ghosts = Vec::new();
    for (line, fields) in read_records(&path, 3)? {
        let index = parse_whole(&path, line, fields[2], "ghost colour")?;
        let color = GhostColor::from_index(index).ok_or_else(|| {
            LevelError::malformed(&path, line, format!("ghost colour must be 0-3, found {index}"))
        })?;
        ghosts.push(Ghost::new(Vec2::new(fields[0], fields[1]), color));
    }

    let collectables = read_records(&dir.join(COLLECTABLE_FILE), 2)?
        .into_iter()
        .map(|(_, fields)| Collectable::new(fields[0], fields[1]))
        .collect();

    let path = dir.join(MOVING_PLATFORM_FILE);
    let mut moving_platforms = Vec::new();
    for (line, f) in read_records(&path, 7)? {
        if f[6] <= 0.0 {
            return Err(LevelError::malformed(
                &path,
                line,
                format!("moving platform speed must be positive, found {}", f[6]),
            ));
        }
        moving_platforms.push(MovingPlatform::new(
            Vec2::new(f[0], f[1]),
            Vec2::new(f[2], f[3]),
            f[4],
            f[5],
            f[6],
        ));
    }

    let metadata = load_metadata(dir)?;

    let level = LevelData {
        start: metadata.start,
        personal_best: metadata.personal_best,
        platforms,
        spikes,
        moving_platforms,
        collectables,
        ghosts,
    };
    log::info!(
        "Loaded level {} ({} entities)",
        dir.display(),
        level.entity_count()
    );
    Ok(level)
}

/// Read `data.txt`. A missing file gives the default start and no best time.
pub fn load_metadata(dir: &Path) -> Result<LevelMetadata, LevelError> {
    let path = dir.join(DATA_FILE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::warn!("{} missing, using default start", path.display());
            return Ok(LevelMetadata {
                start: DEFAULT_START,
                personal_best: None,
            });
        }
        Err(err) => return Err(LevelError::io(&path, err)),
    };

    let mut lines = raw.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let start = match lines.next() {
        Some((index, text)) => {
            let fields = parse_fields(&path, index + 1, text, 2)?;
            Vec2::new(fields[0], fields[1])
        }
        None => DEFAULT_START,
    };
    let personal_best = match lines.next() {
        Some((index, text)) => best_from_disk(parse_seconds(&path, index + 1, text)?),
        None => None,
    };

    Ok(LevelMetadata {
        start,
        personal_best,
    })
}

/// Write every file of `level` into `dir`, creating it if needed.
pub fn save_level(dir: &Path, level: &LevelData) -> Result<(), LevelError> {
    fs::create_dir_all(dir).map_err(|e| LevelError::io(dir, e))?;

    let mut files: Vec<(&str, String)> = PlatformKind::ALL
        .iter()
        .map(|kind| {
            let body = level
                .platforms
                .iter()
                .filter(|p| p.kind == *kind)
                .map(|p| format!("{} {} {} {}\n", p.pos.x, p.pos.y, p.length, p.width))
                .collect();
            (platform_file(*kind), body)
        })
        .collect();

    files.push((
        SPIKE_FILE,
        level
            .spikes
            .iter()
            .map(|s| format!("{} {} {} {}\n", s.pos.x, s.pos.y, s.count, u8::from(s.flip)))
            .collect(),
    ));
    files.push((
        GHOST_FILE,
        level
            .ghosts
            .iter()
            .map(|g| format!("{} {} {}\n", g.spawn.x, g.spawn.y, g.color.index()))
            .collect(),
    ));
    files.push((
        COLLECTABLE_FILE,
        level
            .collectables
            .iter()
            .map(|c| format!("{} {}\n", c.pos.x, c.anchor_y))
            .collect(),
    ));
    files.push((
        MOVING_PLATFORM_FILE,
        level
            .moving_platforms
            .iter()
            .map(|m| {
                format!(
                    "{} {} {} {} {} {} {}\n",
                    m.pos1.x, m.pos1.y, m.pos2.x, m.pos2.y, m.length, m.width, m.speed
                )
            })
            .collect(),
    ));
    files.push((
        DATA_FILE,
        render_metadata(&LevelMetadata {
            start: level.start,
            personal_best: level.personal_best,
        }),
    ));

    for (name, body) in &files {
        write_atomic(&dir.join(name), body)?;
    }
    log::info!(
        "Saved level {} ({} entities)",
        dir.display(),
        level.entity_count()
    );
    Ok(())
}

pub fn personal_best(dir: &Path) -> Result<Option<f64>, LevelError> {
    Ok(load_metadata(dir)?.personal_best)
}

/// Record a completion time. The stored best only ever goes down; an unset
/// best is replaced by any time. Returns whether the best changed.
pub fn update_personal_best(dir: &Path, seconds: f64) -> Result<bool, LevelError> {
    let mut metadata = load_metadata(dir)?;
    let improved = match metadata.personal_best {
        None => true,
        Some(best) => seconds < best,
    };
    if improved {
        metadata.personal_best = Some(seconds);
        write_atomic(&dir.join(DATA_FILE), &render_metadata(&metadata))?;
        log::info!("New personal best {seconds:.2}s for {}", dir.display());
    }
    Ok(improved)
}

fn render_metadata(metadata: &LevelMetadata) -> String {
    format!(
        "{} {}\n{}\n",
        metadata.start.x,
        metadata.start.y,
        metadata.personal_best.unwrap_or(0.0)
    )
}

/// 0 on disk means "no best yet".
fn best_from_disk(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

fn parse_seconds(path: &Path, line: usize, text: &str) -> Result<f64, LevelError> {
    let token = text.trim();
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(LevelError::malformed(
            path,
            line,
            format!("personal best must be a non-negative number, found '{token}'"),
        )),
    }
}

/// Write to a sibling temp file then rename over `path`, so a crash never
/// leaves a truncated file behind.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), LevelError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp, contents).map_err(|e| LevelError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| LevelError::io(path, e))
}

/// Parse every record in `path`. Returns `(line_number, fields)` pairs; a
/// missing file has no records.
fn read_records(path: &Path, arity: usize) -> Result<Vec<(usize, Vec<f32>)>, LevelError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} missing, treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(LevelError::io(path, err)),
    };

    raw.lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| {
            let line = index + 1;
            parse_fields(path, line, text, arity).map(|fields| (line, fields))
        })
        .collect()
}

fn parse_fields(path: &Path, line: usize, text: &str, arity: usize) -> Result<Vec<f32>, LevelError> {
    let fields = text
        .split_whitespace()
        .map(|token| match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(_) => Err(LevelError::malformed(path, line, format!("non-finite value '{token}'"))),
            Err(_) => Err(LevelError::malformed(path, line, format!("not a number: '{token}'"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if fields.len() != arity {
        return Err(LevelError::malformed(
            path,
            line,
            format!("expected {arity} fields, found {}", fields.len()),
        ));
    }
    Ok(fields)
}

fn parse_whole(path: &Path, line: usize, value: f32, what: &str) -> Result<u32, LevelError> {
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f32 {
        return Err(LevelError::malformed(
            path,
            line,
            format!("{what} must be a whole number, found {value}"),
        ));
    }
    Ok(value as u32)
}
