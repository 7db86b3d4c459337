//! Game layer for GridCity.
//!
//! Implements the city-building rules:
//! - Board with tiles of five building categories
//! - Placement legality (adjacency rule)
//! - Whole-board scoring, coin income, profit and upkeep
//! - Board growth and per-turn building offers
//! - The session state machine tying them together

mod board;
mod config;
mod growth;
mod invariants;
mod offer;
mod placement;
mod scoring;
mod session;

pub use board::{Board, Category, Coord, Tile};
pub use config::{
    ARCADE_DEFAULT_SIZE, ARCADE_OFFER_SIZE, Coins, ConfigError, ConfigFile,
    FREEPLAY_GROWTH_INCREMENT, FREEPLAY_INITIAL_SIZE, FREEPLAY_LOSS_STREAK_LIMIT,
    FREEPLAY_MAX_SIZE, Mode, SANDBOX_DEFAULT_SIZE, SessionConfig, UNBOUNDED_SENTINEL,
    arcade_starting_coins,
};
pub use growth::{Growth, GrowthPolicy};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use offer::draw_offers;
pub use placement::{PlacementRule, is_legal};
pub use scoring::{ScoreReport, cluster_size, is_cluster, recompute};
pub use session::{
    ChannelObserver, EconomyState, GameSession, PlacementOutcome, SessionObserver, SessionView,
    TerminalReason, TerminationPolicy,
};
