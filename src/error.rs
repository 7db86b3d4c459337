//! Error types for the simulation core.
//!
//! Every variant is recoverable: a failed operation leaves the session
//! exactly as it was and hands the condition back to the caller.

use thiserror::Error;

use crate::game::Category;

/// Errors returned by board, session and snapshot operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The coordinate lies outside the board.
    #[error("({x}, {y}) is outside the board")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// The target cell already holds a building.
    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied {
        /// Column of the occupied cell.
        x: i32,
        /// Row of the occupied cell.
        y: i32,
    },

    /// The placement does not touch an existing building.
    #[error("invalid placement at ({x}, {y}): buildings must be placed adjacent to existing buildings")]
    InvalidPlacement {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// Demolition was requested on an empty cell.
    #[error("nothing to demolish at ({x}, {y})")]
    NothingToDemolish {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// The action costs coins the session does not have.
    #[error("insufficient funds: {coins} coins left")]
    InsufficientFunds {
        /// Coins held when the action was refused.
        coins: i64,
    },

    /// The session has ended and accepts no more mutations.
    #[error("the game is over")]
    SessionTerminal,

    /// The category is not among this turn's offered buildings.
    #[error("{0} is not offered this turn")]
    CategoryNotOffered(Category),

    /// A snapshot could not be turned back into a session.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// A session configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GameError::OutOfBounds { x: -1, y: 3 };
        assert_eq!(err.to_string(), "(-1, 3) is outside the board");

        let err = GameError::CategoryNotOffered(Category::Park);
        assert_eq!(err.to_string(), "Park is not offered this turn");
    }
}
