//! Random-move autoplayer.
//!
//! Provides a pure function interface: `(seed, config, turn_limit) -> GameSummary`.
//! The same inputs always play the same game, which makes it useful for
//! batch statistics, benchmarks and regression tests.

use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::GameResult;
use crate::game::{Coins, GameSession, Mode, SessionConfig, TerminalReason, check_invariants};

/// Offset applied to the game seed for the bot's own RNG, keeping its
/// choices independent of the offer stream.
const BOT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Why an autoplayed game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The session reached its terminal state.
    Terminal(TerminalReason),
    /// No empty cell accepts a building.
    NoLegalMove,
    /// The turn limit was reached first.
    TurnLimit,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Terminal(reason) => write!(f, "{reason}"),
            EndReason::NoLegalMove => f.write_str("no legal move"),
            EndReason::TurnLimit => f.write_str("turn limit"),
        }
    }
}

/// Final result of an autoplayed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    /// The seed used for this game.
    pub seed: u64,
    /// Game mode.
    pub mode: Mode,
    /// Score when the game stopped.
    pub final_score: i64,
    /// Successful placements.
    pub turns_played: u32,
    /// Treasury when the game stopped.
    pub coins: Coins,
    /// Board side length when the game stopped.
    pub board_size: u16,
    /// Occupied cells when the game stopped.
    pub buildings: usize,
    /// Why the game stopped.
    pub end: EndReason,
    /// Invariant violations found at the end (should be zero).
    pub violations: usize,
}

/// Play one game with uniformly random offered buildings on random legal cells.
///
/// # Errors
///
/// Returns [`crate::GameError::InvalidConfig`] if the configuration is invalid.
pub fn play_random_game(seed: u64, config: SessionConfig, turn_limit: u32) -> GameResult<GameSummary> {
    let mut session = GameSession::with_seed(config, seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(BOT_SEED_SALT));

    let end = loop {
        if let Some(reason) = session.terminal_reason() {
            break EndReason::Terminal(reason);
        }
        if session.economy().turn_number >= turn_limit {
            break EndReason::TurnLimit;
        }

        let cells = session.legal_cells();
        let Some(&coord) = cells.choose(&mut rng) else {
            break EndReason::NoLegalMove;
        };
        let category = session.offers()[rng.gen_range(0..session.offers().len())];
        session.place(category, coord)?;
    };

    let summary = GameSummary {
        seed,
        mode: config.mode,
        final_score: session.economy().score,
        turns_played: session.economy().turn_number,
        coins: session.economy().coins,
        board_size: session.board().width(),
        buildings: session.board().occupied_count(),
        end,
        violations: check_invariants(&session).len(),
    };
    debug!(seed, score = summary.final_score, turns = summary.turns_played, %end, "autoplay finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = play_random_game(17, SessionConfig::arcade(7), 500).unwrap();
        let b = play_random_game(17, SessionConfig::arcade(7), 500).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_arcade_ends_terminal() {
        let summary = play_random_game(3, SessionConfig::arcade(5), 1_000).unwrap();
        assert!(matches!(summary.end, EndReason::Terminal(_)));
        assert_eq!(summary.violations, 0);
    }

    #[test]
    fn test_sandbox_stops_when_full() {
        let summary = play_random_game(5, SessionConfig::sandbox(3), 1_000).unwrap();
        assert_eq!(summary.end, EndReason::NoLegalMove);
        assert_eq!(summary.buildings, 9);
        assert_eq!(summary.turns_played, 9);
    }

    #[test]
    fn test_turn_limit() {
        let summary = play_random_game(1, SessionConfig::sandbox(10), 4).unwrap();
        assert_eq!(summary.end, EndReason::TurnLimit);
        assert_eq!(summary.turns_played, 4);
    }

    #[test]
    fn test_freeplay_respects_max_size() {
        let summary = play_random_game(8, SessionConfig::freeplay(), 200).unwrap();
        assert!(summary.board_size <= 25);
        assert_eq!(summary.violations, 0);
    }
}
