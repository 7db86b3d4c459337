//! Autoplay command implementation.

use super::output::{BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, SessionArgs};
use gridcity::autoplay::play_random_game;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// Execute the autoplay command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub(crate) fn execute(
    session: &SessionArgs,
    games: u64,
    threads: Option<usize>,
    max_turns: u32,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = session.resolve()?;
    let base_seed = session.seed();

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // Progress bar
    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    info!(games, base_seed, mode = %config.mode, "autoplay started");
    let start = Instant::now();

    // Each thread accumulates into its own BatchStats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(BatchStats::default, |mut local_stats, i| {
            let game_seed = base_seed.wrapping_add(i);
            match play_random_game(game_seed, config, max_turns) {
                Ok(summary) => local_stats.add_result(&summary),
                Err(e) => {
                    warn!(seed = game_seed, error = %e, "game failed to start");
                    local_stats.errors += 1;
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local_stats
        })
        .reduce(BatchStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let played = stats.games_played as f64;
        played / duration.as_secs_f64()
    } else {
        0.0
    };

    if stats.violating_games > 0 {
        warn!(games = stats.violating_games, "invariant violations detected");
    }

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats, config.mode));
            println!();
            println!("Duration: {:.2}s ({:.0} games/sec)", duration.as_secs_f64(), games_per_sec);
        }
        BatchFormat::Json => {
            let json_result = JsonBatchResult::from_stats(&stats, config.mode);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats, config.mode));
        }
    }

    Ok(())
}
