//! Session invariants - sanity checks that detect bugs.
//!
//! A session built through `place`, `demolish` and `select` should never
//! trigger these. Restored snapshots are the usual way to end up with a
//! state that does, which is why the `validate` command runs them.

use std::collections::HashSet;

use crate::game::{GameSession, TerminationPolicy};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all session invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(session: &GameSession) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });

    let board = session.board();
    let config = session.config();
    let economy = session.economy();

    let expected_cells = usize::from(board.width()) * usize::from(board.height());
    if board.cells().len() != expected_cells {
        violation(format!(
            "Board storage holds {} cells for a {}x{} board",
            board.cells().len(),
            board.width(),
            board.height()
        ));
    }

    let oversized = config
        .max_size
        .filter(|&max| config.growth_enabled && (board.width() > max || board.height() > max));
    if let Some(max) = oversized {
        violation(format!(
            "Board size {}x{} exceeds max size {max}",
            board.width(),
            board.height()
        ));
    }

    let occupied = board.occupied_count();
    if u64::try_from(occupied).unwrap_or(u64::MAX) > u64::from(economy.turn_number) {
        violation(format!(
            "Board holds {occupied} buildings after only {} placements",
            economy.turn_number
        ));
    }

    let over_limit = config
        .loss_streak_limit
        .filter(|&limit| economy.consecutive_loss_turns > limit);
    if let Some(limit) = over_limit {
        violation(format!(
            "Loss streak {} exceeds limit {limit}",
            economy.consecutive_loss_turns
        ));
    }

    let expected_terminal = TerminationPolicy::from_config(config).evaluate(board, economy);
    if expected_terminal != session.terminal_reason() {
        violation(format!(
            "Terminal state {:?} disagrees with termination predicate {:?}",
            session.terminal_reason(),
            expected_terminal
        ));
    }

    let offers = session.offers();
    let distinct: HashSet<_> = offers.iter().collect();
    if distinct.len() != offers.len() {
        violation(format!("Offers {offers:?} contain duplicates"));
    }
    if let Some(size) = config.offer_size.filter(|&size| offers.len() != size) {
        violation(format!("{} buildings offered, expected {size}", offers.len()));
    }

    if let Some(selected) = session.selected().filter(|selected| !offers.contains(selected)) {
        violation(format!("Selected building {selected} is not offered"));
    }

    violations
}

/// Assert all session invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(session: &GameSession) {
    let violations = check_invariants(session);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Session invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_session: &GameSession) {}
