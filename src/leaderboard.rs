//! High-score boards.
//!
//! Two boards exist, one for arcade and one for freeplay, each holding at
//! most [`CAPACITY`] entries in descending score order. Among equal scores
//! the newer entry ranks higher, so when a full board must drop one of
//! several tied lowest entries, the oldest goes.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Entries kept per board.
pub const CAPACITY: usize = 10;

/// Which high-score board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardName {
    /// Arcade scores.
    Arcade,
    /// Freeplay scores.
    Freeplay,
}

impl BoardName {
    /// Both boards.
    pub const ALL: [BoardName; 2] = [BoardName::Arcade, BoardName::Freeplay];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BoardName::Arcade => "arcade",
            BoardName::Freeplay => "freeplay",
        }
    }
}

impl fmt::Display for BoardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoardName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoardName::ALL
            .into_iter()
            .find(|board| board.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown leaderboard '{s}' (expected arcade or freeplay)"))
    }
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Player name.
    pub name: String,
    /// Final score.
    pub score: i64,
}

/// Errors from a leaderboard backend.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The score file is corrupt.
    #[error("invalid leaderboard JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A place to keep high scores.
pub trait Leaderboard {
    /// Entries on a board, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn fetch_top(&self, board: BoardName) -> Result<Vec<Entry>, LeaderboardError>;

    /// True if `score` would make it onto the board.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn qualifies(&self, board: BoardName, score: i64) -> Result<bool, LeaderboardError> {
        let entries = self.fetch_top(board)?;
        Ok(entries.len() < CAPACITY || entries.iter().any(|entry| score > entry.score))
    }

    /// Record a score. Returns the 0-based rank, or `None` if the score did
    /// not qualify and nothing was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    fn submit(
        &mut self,
        board: BoardName,
        name: &str,
        score: i64,
    ) -> Result<Option<usize>, LeaderboardError>;
}

/// Insert into a best-first list, returning the rank if the entry was kept.
fn insert_ranked(entries: &mut Vec<Entry>, name: &str, score: i64) -> Option<usize> {
    if entries.len() >= CAPACITY && entries.iter().all(|entry| score <= entry.score) {
        return None;
    }
    let rank = entries.partition_point(|entry| entry.score > score);
    entries.insert(
        rank,
        Entry {
            name: name.to_string(),
            score,
        },
    );
    entries.truncate(CAPACITY);
    Some(rank)
}

/// In-process leaderboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    boards: BTreeMap<BoardName, Vec<Entry>>,
}

impl MemoryLeaderboard {
    /// Empty boards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn fetch_top(&self, board: BoardName) -> Result<Vec<Entry>, LeaderboardError> {
        Ok(self.boards.get(&board).cloned().unwrap_or_default())
    }

    fn submit(
        &mut self,
        board: BoardName,
        name: &str,
        score: i64,
    ) -> Result<Option<usize>, LeaderboardError> {
        Ok(insert_ranked(self.boards.entry(board).or_default(), name, score))
    }
}

/// Leaderboard persisted as one JSON file, rewritten on every submit.
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
    boards: BTreeMap<BoardName, Vec<Entry>>,
}

impl FileLeaderboard {
    /// Open a score file. A missing file is an empty leaderboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let mut boards: BTreeMap<BoardName, Vec<Entry>> = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        // Hand-edited files may be unordered or overfull; ties keep file order
        for entries in boards.values_mut() {
            entries.sort_by_key(|entry| Reverse(entry.score));
            entries.truncate(CAPACITY);
        }
        Ok(Self { path, boards })
    }

    /// Score file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, boards: &BTreeMap<BoardName, Vec<Entry>>) -> Result<(), LeaderboardError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(boards)?)?;
        Ok(())
    }
}

impl Leaderboard for FileLeaderboard {
    fn fetch_top(&self, board: BoardName) -> Result<Vec<Entry>, LeaderboardError> {
        Ok(self.boards.get(&board).cloned().unwrap_or_default())
    }

    fn submit(
        &mut self,
        board: BoardName,
        name: &str,
        score: i64,
    ) -> Result<Option<usize>, LeaderboardError> {
        // Only commit once the file is written
        let mut updated = self.boards.clone();
        let rank = insert_ranked(updated.entry(board).or_default(), name, score);
        if rank.is_some() {
            self.write(&updated)?;
            self.boards = updated;
            info!(%board, name, score, "score submitted");
        }
        Ok(rank)
    }
}
