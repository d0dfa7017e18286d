//! Headless front end for the platformer core.
//!
//! `check` validates a level directory, `simulate` runs a level for a fixed
//! number of frames (idle or driven by a replay file), and `new` / `list`
//! manage the custom levels under a `game_data` root.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pmp_core::input::FrameInput;
use pmp_game::config::{load_config_from_path, GameConfig};
use pmp_game::level::{self, LevelData};
use pmp_game::replay::load_replay_from_path;
use pmp_game::store::LevelStore;
use pmp_game::world::WorldState;

#[derive(Parser)]
#[command(name = "pmp_game")]
#[command(about = "Pacman platformer level tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a level directory and print a summary
    Check { level_dir: PathBuf },
    /// Run a level headlessly and print the outcome
    Simulate {
        level_dir: PathBuf,
        /// Replay JSON driving the player; idle input when absent
        #[arg(long)]
        replay: Option<PathBuf>,
        /// Frames to run when no replay is given
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// Game config JSON
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Create an empty custom level named unnamedN
    New {
        #[arg(long, default_value = "game_data")]
        root: PathBuf,
    },
    /// List custom levels, their personal bests and campaign progress
    List {
        #[arg(long, default_value = "game_data")]
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check { level_dir } => check(&level_dir),
        Commands::Simulate {
            level_dir,
            replay,
            frames,
            config,
            seed,
        } => simulate(&level_dir, replay.as_deref(), frames, config.as_deref(), seed),
        Commands::New { root } => new_level(&root),
        Commands::List { root } => list(&root),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn check(level_dir: &Path) -> Result<(), String> {
    let level = level::load_level(level_dir).map_err(|e| e.to_string())?;
    println!("{}", level_dir.display());
    println!("  start         ({}, {})", level.start.x, level.start.y);
    println!("  personal best {}", format_best(level.personal_best));
    println!("  platforms     {}", level.platforms.len());
    println!("  spikes        {}", level.spikes.len());
    println!("  moving        {}", level.moving_platforms.len());
    println!("  collectables  {}", level.collectables.len());
    println!("  ghosts        {}", level.ghosts.len());
    Ok(())
}

fn simulate(
    level_dir: &Path,
    replay: Option<&Path>,
    frames: u32,
    config: Option<&Path>,
    seed: u64,
) -> Result<(), String> {
    let config = match config {
        Some(path) => load_config_from_path(path)?,
        None => GameConfig::default(),
    };
    let level = level::load_level(level_dir).map_err(|e| e.to_string())?;
    let collectables = level.collectables.len();
    let inputs = match replay {
        Some(path) => load_replay_from_path(path)?.expanded_inputs(),
        None => vec![FrameInput::idle(); frames as usize],
    };

    let mut world = WorldState::from_level(level, config, seed);
    let mut deaths = 0u32;
    let mut ghosts_killed = 0u32;
    let mut won_at = None;
    for (frame, input) in inputs.iter().enumerate() {
        let report = world.step(input);
        deaths += u32::from(report.player_died);
        ghosts_killed += report.ghosts_killed;
        if report.won {
            won_at = Some(frame + 1);
            break;
        }
    }

    match won_at {
        Some(frame) => println!(
            "won on frame {frame} in {:.2}s",
            world.timer().elapsed_centiseconds_rounded()
        ),
        None => println!(
            "not won after {} frames: {}/{collectables} collected",
            inputs.len(),
            world.score
        ),
    }
    println!("deaths {deaths}, ghosts killed {ghosts_killed}");
    println!(
        "player at ({:.1}, {:.1}), alive: {}",
        world.player.pos.x,
        world.player.pos.y,
        world.player.is_alive()
    );
    Ok(())
}

fn new_level(root: &Path) -> Result<(), String> {
    let store = LevelStore::new(root);
    let name = store
        .save_custom(None, &LevelData::default())
        .map_err(|e| e.to_string())?;
    println!("{}", store.custom_dir(&name).display());
    Ok(())
}

fn list(root: &Path) -> Result<(), String> {
    let store = LevelStore::new(root);
    let progress = store.progress().map_err(|e| e.to_string())?;
    println!(
        "built-in levels: {}, completed: {progress}",
        store.built_in_count()
    );
    for name in store.list_custom().map_err(|e| e.to_string())? {
        let best = store
            .personal_best(&store.custom_dir(&name))
            .map_err(|e| e.to_string())?;
        println!("  {name:<20} {}", format_best(best));
    }
    Ok(())
}

fn format_best(best: Option<f64>) -> String {
    match best {
        Some(seconds) => format!("{seconds:.2}s"),
        None => "-".to_string(),
    }
}
