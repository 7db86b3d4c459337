//! Output formatting utilities for CLI.

// Statistics convert counts to f64 for averages
#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;
use std::fmt::Write as _;

use gridcity::autoplay::{EndReason, GameSummary};
use gridcity::game::{GameSession, Mode};
use gridcity::leaderboard::{BoardName, Entry};
use gridcity::snapshot::Snapshot;
use serde::Serialize;

/// JSON-serializable session result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSessionResult {
    /// Whether the game has ended.
    game_over: bool,
    /// Why it ended, if it has.
    terminal_reason: Option<String>,
    /// Moves rejected along the way.
    rejected: Vec<JsonRejectedMove>,
    /// Full session snapshot.
    snapshot: Snapshot,
}

/// A move that was refused.
#[derive(Debug, Serialize)]
pub(super) struct JsonRejectedMove {
    /// The move as written.
    pub(super) input: String,
    /// Why it was refused.
    pub(super) error: String,
}

impl JsonSessionResult {
    /// Create from a session and its rejected moves.
    pub(super) fn from_session(session: &GameSession, rejected: Vec<JsonRejectedMove>) -> Self {
        Self {
            game_over: session.is_game_over(),
            terminal_reason: session.terminal_reason().map(|r| r.to_string()),
            rejected,
            snapshot: session.snapshot(),
        }
    }
}

/// Aggregated autoplay statistics.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Games that failed to start.
    pub(super) errors: u64,
    /// Sum of final scores.
    total_score: i64,
    /// Sum of squared final scores for std dev calculation.
    score_sq_sum: f64,
    /// Best final score and its seed.
    best: Option<(i64, u64)>,
    /// Total turns across all games.
    total_turns: u64,
    /// Games that ended with invariant violations.
    pub(super) violating_games: u64,
    /// How games ended.
    end_reasons: BTreeMap<String, u64>,
}

impl BatchStats {
    /// Add a game summary to the stats.
    pub(super) fn add_result(&mut self, summary: &GameSummary) {
        self.games_played += 1;
        self.total_score += summary.final_score;
        let score = summary.final_score as f64;
        self.score_sq_sum += score * score;
        self.total_turns += u64::from(summary.turns_played);
        if summary.violations > 0 {
            self.violating_games += 1;
        }
        if self.best.is_none_or(|(best, _)| summary.final_score > best) {
            self.best = Some((summary.final_score, summary.seed));
        }
        *self.end_reasons.entry(end_label(summary.end)).or_insert(0) += 1;
    }

    /// Merge stats from another thread.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.errors += other.errors;
        self.total_score += other.total_score;
        self.score_sq_sum += other.score_sq_sum;
        self.total_turns += other.total_turns;
        self.violating_games += other.violating_games;
        if let Some((score, seed)) = other.best {
            if self.best.is_none_or(|(best, _)| score > best) {
                self.best = Some((score, seed));
            }
        }
        for (reason, count) in &other.end_reasons {
            *self.end_reasons.entry(reason.clone()).or_insert(0) += count;
        }
    }

    /// Average final score.
    pub(super) fn avg_score(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.games_played as f64
    }

    /// Final score standard deviation.
    pub(super) fn score_std_dev(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_score();
        let variance = (self.score_sq_sum / n) - (mean * mean);
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Average game length.
    pub(super) fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }
}

fn end_label(end: EndReason) -> String {
    end.to_string().replace(' ', "_")
}

/// JSON-serializable autoplay result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    mode: Mode,
    games_played: u64,
    errors: u64,
    avg_score: f64,
    score_std_dev: f64,
    best_score: Option<i64>,
    best_seed: Option<u64>,
    avg_turns: f64,
    violating_games: u64,
    end_reasons: BTreeMap<String, u64>,
}

impl JsonBatchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BatchStats, mode: Mode) -> Self {
        Self {
            mode,
            games_played: stats.games_played,
            errors: stats.errors,
            avg_score: stats.avg_score(),
            score_std_dev: stats.score_std_dev(),
            best_score: stats.best.map(|(score, _)| score),
            best_seed: stats.best.map(|(_, seed)| seed),
            avg_turns: stats.avg_turns(),
            violating_games: stats.violating_games,
            end_reasons: stats.end_reasons.clone(),
        }
    }
}

/// Format autoplay stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats, mode: Mode) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Autoplay Results ({} {mode} games)", stats.games_played);
    output.push_str("========================================\n\n");

    let _ = writeln!(
        output,
        "Average Score: {:.1} (+/- {:.1})",
        stats.avg_score(),
        stats.score_std_dev()
    );
    if let Some((score, seed)) = stats.best {
        let _ = writeln!(output, "Best Score:    {score} (seed {seed})");
    }
    let _ = writeln!(output, "Average Game Length: {:.1} turns\n", stats.avg_turns());

    output.push_str("Game Endings:\n");
    for (reason, count) in &stats.end_reasons {
        let rate = *count as f64 / stats.games_played.max(1) as f64 * 100.0;
        let _ = writeln!(output, "  {reason}: {count} ({rate:.1}%)");
    }

    if stats.errors > 0 {
        let _ = writeln!(output, "\nFailed to start: {}", stats.errors);
    }
    if stats.violating_games > 0 {
        let _ = writeln!(output, "\nWARNING: {} games broke invariants", stats.violating_games);
    }

    output
}

/// Format autoplay stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats, mode: Mode) -> String {
    let mut output = String::new();

    output.push_str("mode,games,avg_score,score_std_dev,best_score,avg_turns,violating_games\n");
    let _ = writeln!(
        output,
        "{mode},{},{:.2},{:.2},{},{:.2},{}",
        stats.games_played,
        stats.avg_score(),
        stats.score_std_dev(),
        stats.best.map_or(String::new(), |(score, _)| score.to_string()),
        stats.avg_turns(),
        stats.violating_games
    );

    output
}

/// Format a leaderboard as text.
pub(super) fn format_scores_text(board: BoardName, entries: &[Entry]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{} High Scores", capitalize(board.name()));
    output.push_str("========================================\n");
    if entries.is_empty() {
        output.push_str("  (no scores yet)\n");
    }
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(output, "  {:>2}. {:<20} {:>6}", rank + 1, entry.name, entry.score);
    }

    output
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}
