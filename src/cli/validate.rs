//! Snapshot validation command implementation.

use super::CliError;
use gridcity::game::{GameSession, SessionConfig, check_invariants};
use gridcity::snapshot::Snapshot;
use std::path::{Path, PathBuf};

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read, cannot be restored, or
/// breaks a session invariant.
pub(crate) fn execute(snapshot_path: &Path, config: Option<PathBuf>) -> Result<(), CliError> {
    println!("Validating: {}", snapshot_path.display());
    println!();

    let snapshot = Snapshot::load(snapshot_path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", snapshot_path.display())))?;
    print_check("Snapshot parses", true);

    let session = match &config {
        Some(path) => {
            let config = SessionConfig::load(path)
                .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?;
            GameSession::from_snapshot_with_config(&snapshot, config)
        }
        None => GameSession::from_snapshot(&snapshot),
    };
    print_check("Session restores", session.is_ok());
    let session = session?;

    let violations = check_invariants(&session);
    print_check("Invariants hold", violations.is_empty());
    for violation in &violations {
        println!("    {violation}");
    }

    println!();
    println!("Summary:");
    println!("  Mode:      {}", session.config().mode);
    println!("  Board:     {}x{}", session.board().width(), session.board().height());
    println!("  Buildings: {}", session.board().occupied_count());
    println!("  Turn:      {}", session.economy().turn_number);
    println!("  Score:     {}", session.economy().score);
    println!("  Coins:     {}", session.economy().coins);
    if let Some(reason) = session.terminal_reason() {
        println!("  Status:    game over ({reason})");
    }

    if !violations.is_empty() {
        return Err(CliError::new(format!("{} invariant violation(s)", violations.len())));
    }

    println!();
    println!("Validation successful!");
    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
