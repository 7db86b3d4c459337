//! CLI command implementations for GridCity.

pub(crate) mod autoplay;
pub(crate) mod play;
pub(crate) mod run;
pub(crate) mod saves;
pub(crate) mod scores;
pub(crate) mod validate;

mod output;

use clap::{Args, ValueEnum};
use gridcity::game::{Coins, ConfigError, ConfigFile, GameSession, Mode, SessionConfig};
use gridcity::leaderboard::{FileLeaderboard, LeaderboardError};
use gridcity::snapshot::{PersistError, SaveStore, data_dir};
use gridcity::GameError;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Output format for single-game commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `autoplay` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Options shared by every command that starts a session.
#[derive(Args, Debug, Clone)]
pub(crate) struct SessionArgs {
    /// Game mode: arcade, freeplay, or sandbox
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Starting board size
    #[arg(long)]
    size: Option<u16>,

    /// Starting coins (overrides the mode preset)
    #[arg(long)]
    coins: Option<i64>,

    /// TOML file with rule overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for building offers (default: random)
    #[arg(short, long)]
    seed: Option<u64>,
}

impl SessionArgs {
    /// Merge the config file with command-line overrides.
    pub(crate) fn resolve(&self) -> Result<SessionConfig, CliError> {
        self.resolve_with_mode(None)
    }

    /// Like [`resolve`](Self::resolve), with `fallback` as the preset when
    /// neither the command line nor the config file names a mode.
    pub(crate) fn resolve_with_mode(&self, fallback: Option<Mode>) -> Result<SessionConfig, CliError> {
        let mut file = match &self.config {
            Some(path) => ConfigFile::load(path)
                .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?,
            None => ConfigFile::default(),
        };

        file.mode = self.mode.or(file.mode).or(fallback);
        if self.size.is_some() {
            file.initial_size = self.size;
        }
        if let Some(coins) = self.coins {
            file.initial_coins = Some(Coins::Finite(coins));
        }

        Ok(file.into_config()?)
    }

    /// Whether any rule was given on the command line.
    pub(crate) fn has_overrides(&self) -> bool {
        self.mode.is_some() || self.size.is_some() || self.coins.is_some() || self.config.is_some()
    }

    /// Seed to use, drawing a random one if none was given.
    pub(crate) fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Start a fresh session.
    pub(crate) fn new_session(&self) -> Result<GameSession, CliError> {
        Ok(GameSession::with_seed(self.resolve()?, self.seed())?)
    }
}

/// Open the save directory, defaulting to `~/.gridcity/saves`.
pub(crate) fn open_saves(dir: Option<PathBuf>) -> Result<SaveStore, CliError> {
    let dir = match dir {
        Some(dir) => dir,
        None => data_dir()?.join("saves"),
    };
    Ok(SaveStore::open(dir)?)
}

/// Open the leaderboard file, defaulting to `~/.gridcity/scores.json`.
pub(crate) fn open_leaderboard(path: Option<PathBuf>) -> Result<FileLeaderboard, CliError> {
    let path = match path {
        Some(path) => path,
        None => data_dir()?.join("scores.json"),
    };
    Ok(FileLeaderboard::open(path)?)
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<GameError> for CliError {
    fn from(e: GameError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<PersistError> for CliError {
    fn from(e: PersistError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<LeaderboardError> for CliError {
    fn from(e: LeaderboardError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}
