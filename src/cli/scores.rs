//! Scores command implementation.

use super::output::format_scores_text;
use super::{CliError, OutputFormat, open_leaderboard};
use gridcity::leaderboard::{BoardName, Leaderboard};
use std::path::PathBuf;

/// Execute the scores command.
///
/// # Errors
///
/// Returns an error if the leaderboard file cannot be read.
pub(crate) fn execute(
    board: BoardName,
    scores: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let leaderboard = open_leaderboard(scores)?;
    let entries = leaderboard.fetch_top(board)?;

    match format {
        OutputFormat::Text => print!("{}", format_scores_text(board, &entries)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }

    Ok(())
}
