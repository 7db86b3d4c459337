//! Session snapshots and named save slots.
//!
//! A [`Snapshot`] is the JSON persistence format of a session: the grid as a
//! row-major matrix of `null` or `{"category": ...}`, the economy counters,
//! the current offers and the mode. Unbounded coins are written as the
//! string `"unbounded"`.
//!
//! [`SaveStore`] keeps snapshots as `<name>.json` files in one directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::{GameError, GameResult};
use crate::game::{Board, Category, Coins, Coord, GameSession, Mode, Tile};

/// A placed building as stored in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTile {
    /// Building category.
    pub category: Category,
}

/// Serializable picture of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Side length of the (square) board.
    pub size: u16,
    /// Row-major grid, `grid[y][x]`.
    pub grid: Vec<Vec<Option<SnapshotTile>>>,
    /// Treasury.
    pub coins: Coins,
    /// Successful placements so far.
    pub turn_number: u32,
    /// Last computed score.
    pub score: i64,
    /// Last computed profit.
    pub profit: i64,
    /// Last computed upkeep.
    pub upkeep: i64,
    /// Consecutive loss-making turns.
    #[serde(default)]
    pub consecutive_loss_turns: u32,
    /// Building the player had picked.
    #[serde(default)]
    pub selected_building: Option<Category>,
    /// Buildings on offer this turn.
    #[serde(default)]
    pub available_buildings: Vec<Category>,
    /// Game mode.
    pub mode: Mode,
    /// Offer seed.
    #[serde(default)]
    pub seed: u64,
}

impl Snapshot {
    /// Capture a session.
    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        let board = session.board();
        let economy = session.economy();
        let grid = board
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|tile| SnapshotTile { category: tile.category }))
                    .collect()
            })
            .collect();

        Self {
            size: board.width(),
            grid,
            coins: economy.coins,
            turn_number: economy.turn_number,
            score: economy.score,
            profit: economy.profit,
            upkeep: economy.upkeep,
            consecutive_loss_turns: economy.consecutive_loss_turns,
            selected_building: session.selected(),
            available_buildings: session.offers().to_vec(),
            mode: session.config().mode,
            seed: session.seed(),
        }
    }

    /// Rebuild the board, checking the grid matches `size`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedSnapshot`] if the size is zero or the
    /// grid is not `size` rows of `size` cells.
    pub fn to_board(&self) -> GameResult<Board> {
        let mut board = Board::square(self.size)
            .ok_or_else(|| GameError::MalformedSnapshot("board size must be at least 1".into()))?;

        let size = usize::from(self.size);
        if self.grid.len() != size {
            return Err(GameError::MalformedSnapshot(format!(
                "expected {size} rows, found {}",
                self.grid.len()
            )));
        }

        for (y, row) in (0i32..).zip(&self.grid) {
            if row.len() != size {
                return Err(GameError::MalformedSnapshot(format!(
                    "row {y} has {} cells, expected {size}",
                    row.len()
                )));
            }
            for (x, cell) in (0i32..).zip(row) {
                if let Some(tile) = cell {
                    board.set(Coord::new(x, y), Tile::new(tile.category))?;
                }
            }
        }

        Ok(board)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Write a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Errors from snapshot files and save slots.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The file is not a valid snapshot.
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot parsed but describes an impossible session.
    #[error(transparent)]
    Game(#[from] GameError),
    /// Save names must be non-empty and use only `[A-Za-z0-9_-]`.
    #[error("invalid save name '{0}'")]
    InvalidName(String),
    /// No save with this name exists.
    #[error("no save named '{0}'")]
    NotFound(String),
}

/// Directory of named snapshot files.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    /// Open (and create if needed) a save directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the saves.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, PersistError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(self.dir.join(format!("{name}.json")))
        } else {
            Err(PersistError::InvalidName(name.to_string()))
        }
    }

    /// Save a session under `name`, replacing any existing save.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or a failed write.
    pub fn save(&self, name: &str, session: &GameSession) -> Result<PathBuf, PersistError> {
        let path = self.path_for(name)?;
        session.snapshot().save(&path)?;
        info!(name, path = %path.display(), "game saved");
        Ok(path)
    }

    /// Load the snapshot saved under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::NotFound`] if there is no such save.
    pub fn load(&self, name: &str) -> Result<Snapshot, PersistError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(PersistError::NotFound(name.to_string()));
        }
        let snapshot = Snapshot::load(&path)?;
        info!(name, "game loaded");
        Ok(snapshot)
    }

    /// Load and restore the session saved under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the save is missing, unreadable or inconsistent.
    pub fn restore(&self, name: &str) -> Result<GameSession, PersistError> {
        Ok(GameSession::from_snapshot(&self.load(name)?)?)
    }

    /// Names of all saves, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>, PersistError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete the save called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::NotFound`] if there is no such save.
    pub fn delete(&self, name: &str) -> Result<(), PersistError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(name, "save deleted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(PersistError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Path to the gridcity data directory (`~/.gridcity`).
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or directory
/// creation fails.
pub fn data_dir() -> io::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory"))?;

    let dir = Path::new(&home).join(".gridcity");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SessionConfig;

    fn snapshot_json(grid: &str, coins: &str) -> String {
        format!(
            r#"{{"size":2,"grid":{grid},"coins":{coins},"turnNumber":1,"score":0,
                "profit":0,"upkeep":0,"selectedBuilding":null,
                "availableBuildings":[],"mode":"sandbox"}}"#
        )
    }

    #[test]
    fn test_json_field_names() {
        let session = GameSession::with_seed(SessionConfig::arcade(5), 4).unwrap();
        let json = session.snapshot().to_json().unwrap();
        for field in ["\"turnNumber\"", "\"availableBuildings\"", "\"selectedBuilding\"", "\"mode\": \"arcade\""] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
    }

    #[test]
    fn test_parses_browser_style_snapshot() {
        let json = snapshot_json(r#"[[{"category":"Road"},null],[null,null]]"#, "null");
        let snapshot = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.coins, Coins::Unbounded);
        assert_eq!(snapshot.seed, 0);

        let board = snapshot.to_board().unwrap();
        assert_eq!(board.category_at(Coord::new(0, 0)), Some(Category::Road));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let json = snapshot_json("[[null,null],[null]]", "3");
        let snapshot = Snapshot::from_json(&json).unwrap();
        assert!(matches!(snapshot.to_board(), Err(GameError::MalformedSnapshot(_))));

        let json = snapshot_json("[[null,null]]", "3");
        let snapshot = Snapshot::from_json(&json).unwrap();
        assert!(matches!(
            GameSession::from_snapshot(&snapshot),
            Err(GameError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        let json = r#"{"size":0,"grid":[],"coins":1,"turnNumber":0,"score":0,
            "profit":0,"upkeep":0,"mode":"arcade"}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(snapshot.to_board().is_err());
    }

    #[test]
    fn test_duplicate_offers_rejected() {
        let mut snapshot = GameSession::with_seed(SessionConfig::arcade(5), 1)
            .unwrap()
            .snapshot();
        snapshot.available_buildings = vec![Category::Park, Category::Park];
        assert!(matches!(
            GameSession::from_snapshot(&snapshot),
            Err(GameError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_wrong_offer_count_rejected() {
        let mut snapshot = GameSession::with_seed(SessionConfig::arcade(5), 1)
            .unwrap()
            .snapshot();
        snapshot.available_buildings = Category::ALL.to_vec();
        assert!(matches!(
            GameSession::from_snapshot(&snapshot),
            Err(GameError::MalformedSnapshot(_))
        ));

        snapshot.available_buildings = vec![Category::Road];
        assert!(matches!(
            GameSession::from_snapshot(&snapshot),
            Err(GameError::MalformedSnapshot(_))
        ));

        // Empty means redraw from the seed
        snapshot.available_buildings.clear();
        let restored = GameSession::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.offers().len(), 2);
    }

    #[test]
    fn test_oversized_freeplay_board_is_malformed() {
        let mut snapshot = GameSession::with_seed(SessionConfig::freeplay(), 1)
            .unwrap()
            .snapshot();
        snapshot.size = 30;
        snapshot.grid = vec![vec![None; 30]; 30];
        assert!(matches!(
            GameSession::from_snapshot(&snapshot),
            Err(GameError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_save_name_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::open(dir.path()).unwrap();
        let session = GameSession::with_seed(SessionConfig::sandbox(3), 0).unwrap();

        for bad in ["", "../escape", "with space", "dots.json"] {
            assert!(matches!(store.save(bad, &session), Err(PersistError::InvalidName(_))));
        }
        assert!(store.save("slot-1_b", &session).is_ok());
    }
}
