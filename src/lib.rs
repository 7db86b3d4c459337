// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! GridCity: a turn-based city-building puzzle engine.
//!
//! Players place buildings of five categories on a square grid. Each
//! placement rescores the whole board from adjacency patterns, adjusts the
//! coin treasury, and may grow the board or end the game.
//!
//! Three modes share one engine, differing only in [`game::SessionConfig`]:
//! - **arcade**: finite coins, two random buildings offered per turn
//! - **freeplay**: unbounded coins, profit/upkeep economy, growing board
//! - **sandbox**: unbounded coins, never ends
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │    CLI / TUI driver (gridcity)      │
//! ├─────────────────────────────────────┤
//! │  Snapshots · Saves · Leaderboards   │
//! ├─────────────────────────────────────┤
//! │  GameSession (rules, scoring, etc.) │
//! └─────────────────────────────────────┘
//! ```

pub mod autoplay;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod render;
pub mod snapshot;

pub use error::{GameError, GameResult};

// Re-export key game types at crate root for convenience
pub use game::{Board, Category, Coins, Coord, GameSession, Mode, SessionConfig, Tile};
