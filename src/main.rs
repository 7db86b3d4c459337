//! GridCity CLI - play, script, and analyse city-building games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// GridCity - a turn-based city-building puzzle
#[derive(Parser, Debug)]
#[command(name = "gridcity")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively in the terminal
    Play {
        #[command(flatten)]
        session: cli::SessionArgs,

        /// Resume a save slot instead of starting fresh
        #[arg(short, long)]
        load: Option<String>,
    },

    /// Apply a scripted list of moves and print the result
    Run {
        #[command(flatten)]
        session: cli::SessionArgs,

        /// Moves such as `R@3,4` (place) or `x@3,4` (demolish)
        #[arg(required = true)]
        moves: Vec<String>,

        /// Start from a snapshot file instead of a fresh game
        #[arg(long)]
        from: Option<PathBuf>,

        /// Keep going after a rejected move
        #[arg(short, long)]
        keep_going: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the resulting snapshot to a file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Run many random games in parallel and aggregate statistics
    Autoplay {
        #[command(flatten)]
        session: cli::SessionArgs,

        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per game (default: 1000)
        #[arg(short = 't', long, default_value = "1000")]
        max_turns: u32,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Show a high-score board
    Scores {
        /// Board to show: arcade or freeplay
        #[arg(default_value = "arcade")]
        board: gridcity::leaderboard::BoardName,

        /// Leaderboard file (default: ~/.gridcity/scores.json)
        #[arg(long)]
        scores: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// List or delete save slots
    Saves {
        /// Save directory (default: ~/.gridcity/saves)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Delete this save instead of listing
        #[arg(long)]
        delete: Option<String>,
    },

    /// Check a snapshot file for consistency
    Validate {
        /// Snapshot JSON file
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Rules to validate against (default: the snapshot's mode preset)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the `gridcity=info` default. With a log
/// file the output goes there; otherwise to stderr unless `to_stderr` is off.
fn init_logging(log_file: Option<&Path>, to_stderr: bool) -> Result<(), cli::CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridcity=info"));

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .map_err(|e| cli::CliError::new(format!("Failed to open log file {}: {e}", path.display())))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The TUI owns the terminal, so it only logs to a file.
    let interactive = matches!(args.command, Commands::Play { .. });
    if let Err(e) = init_logging(args.log_file.as_deref(), !interactive) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let result = match args.command {
        Commands::Play { session, load } => cli::play::execute(&session, load),

        Commands::Run {
            session,
            moves,
            from,
            keep_going,
            format,
            save,
        } => cli::run::execute(&session, &moves, from, keep_going, format, save),

        Commands::Autoplay {
            session,
            games,
            threads,
            max_turns,
            format,
            progress,
        } => cli::autoplay::execute(&session, games, threads, max_turns, format, progress),

        Commands::Scores {
            board,
            scores,
            format,
        } => cli::scores::execute(board, scores, format),

        Commands::Saves { dir, delete } => cli::saves::execute(dir, delete),

        Commands::Validate { snapshot, config } => cli::validate::execute(&snapshot, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
