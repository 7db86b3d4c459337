//! Run command implementation - scripted moves.

use super::output::{JsonRejectedMove, JsonSessionResult};
use super::{CliError, OutputFormat, SessionArgs};
use gridcity::game::{Category, Coord, GameSession};
use gridcity::render::render_ascii;
use gridcity::snapshot::Snapshot;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// One scripted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Place a building, written `R@3,4`.
    Place(Category, Coord),
    /// Demolish a building, written `x@3,4`.
    Demolish(Coord),
}

impl FromStr for Move {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::new(format!("Invalid move '{s}' (expected e.g. R@3,4 or x@3,4)"));

        let (action, position) = s.split_once('@').ok_or_else(invalid)?;
        let (x, y) = position.split_once(',').ok_or_else(invalid)?;
        let coord = Coord::new(
            x.trim().parse().map_err(|_| invalid())?,
            y.trim().parse().map_err(|_| invalid())?,
        );

        match action.trim() {
            "x" | "X" => Ok(Move::Demolish(coord)),
            other => other
                .parse::<Category>()
                .map(|category| Move::Place(category, coord))
                .map_err(|e| CliError::new(format!("Invalid move '{s}': {e}"))),
        }
    }
}

fn apply(session: &mut GameSession, mv: Move) -> Result<(), gridcity::GameError> {
    match mv {
        Move::Place(category, coord) => session.place(category, coord).map(|_| ()),
        Move::Demolish(coord) => session.demolish(coord).map(|_| ()),
    }
}

/// Fresh session, or one restored from `from`. Rules given on the command
/// line replace the snapshot's mode preset; the seed always comes from the
/// snapshot.
fn start_session(session_args: &SessionArgs, from: Option<&Path>) -> Result<GameSession, CliError> {
    let Some(path) = from else {
        return session_args.new_session();
    };
    let snapshot = Snapshot::load(path)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?;
    if session_args.has_overrides() {
        let config = session_args.resolve_with_mode(Some(snapshot.mode))?;
        Ok(GameSession::from_snapshot_with_config(&snapshot, config)?)
    } else {
        Ok(GameSession::from_snapshot(&snapshot)?)
    }
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error on a malformed move, on a rejected move unless
/// `keep_going` is set, or if loading or saving fails.
pub(crate) fn execute(
    session_args: &SessionArgs,
    moves: &[String],
    from: Option<PathBuf>,
    keep_going: bool,
    format: OutputFormat,
    save: Option<PathBuf>,
) -> Result<(), CliError> {
    let parsed = moves
        .iter()
        .map(|m| m.parse::<Move>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = start_session(session_args, from.as_deref())?;

    let mut rejected = Vec::new();
    for (input, mv) in moves.iter().zip(parsed) {
        if let Err(e) = apply(&mut session, mv) {
            if !keep_going {
                return Err(CliError::new(format!("Move '{input}' rejected: {e}")));
            }
            warn!(%input, error = %e, "move rejected");
            rejected.push(JsonRejectedMove {
                input: input.clone(),
                error: e.to_string(),
            });
        }
    }

    if let Some(path) = &save {
        session
            .snapshot()
            .save(path)
            .map_err(|e| CliError::new(format!("Failed to save snapshot: {e}")))?;
    }

    match format {
        OutputFormat::Text => {
            print!("{}", render_ascii(&session.view(), false));
            for r in &rejected {
                println!("Rejected {}: {}", r.input, r.error);
            }
            if let Some(path) = save {
                println!("Snapshot saved to: {}", path.display());
            }
        }
        OutputFormat::Json => {
            let json_result = JsonSessionResult::from_session(&session, rejected);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcity::game::{Mode, SessionConfig};

    #[test]
    fn test_parse_place() {
        assert_eq!(
            "R@3,4".parse::<Move>().unwrap(),
            Move::Place(Category::Residential, Coord::new(3, 4))
        );
        assert_eq!(
            "*@0, 1".parse::<Move>().unwrap(),
            Move::Place(Category::Road, Coord::new(0, 1))
        );
        assert_eq!(
            "park@2,2".parse::<Move>().unwrap(),
            Move::Place(Category::Park, Coord::new(2, 2))
        );
    }

    #[test]
    fn test_parse_demolish() {
        assert_eq!("x@-1,2".parse::<Move>().unwrap(), Move::Demolish(Coord::new(-1, 2)));
    }

    fn args(config: Option<PathBuf>, coins: Option<i64>) -> SessionArgs {
        SessionArgs {
            mode: None,
            size: None,
            coins,
            config,
            seed: None,
        }
    }

    fn saved_freeplay(dir: &Path) -> PathBuf {
        let mut session = GameSession::with_seed(SessionConfig::freeplay(), 9).unwrap();
        let category = session.offers()[0];
        session.place(category, Coord::new(1, 1)).unwrap();
        let path = dir.join("city.json");
        session.snapshot().save(&path).unwrap();
        path
    }

    #[test]
    fn test_from_snapshot_keeps_its_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = saved_freeplay(dir.path());

        let session = start_session(&args(None, None), Some(&path)).unwrap();
        assert_eq!(session.config().mode, Mode::Freeplay);
        assert_eq!(session.config().cost_per_action, SessionConfig::freeplay().cost_per_action);
        assert_eq!(session.economy().turn_number, 1);
    }

    #[test]
    fn test_from_snapshot_applies_rule_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = saved_freeplay(dir.path());
        let rules = dir.path().join("rules.toml");
        std::fs::write(&rules, "cost_per_action = 3\n").unwrap();

        let session = start_session(&args(Some(rules), None), Some(&path)).unwrap();
        assert_eq!(session.config().mode, Mode::Freeplay);
        assert_eq!(session.config().cost_per_action, 3);
        assert_eq!(session.economy().turn_number, 1);

        let missing = dir.path().join("missing.toml");
        assert!(start_session(&args(Some(missing), None), Some(&path)).is_err());
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["R3,4", "R@3", "Q@1,1", "R@a,b", ""] {
            assert!(bad.parse::<Move>().is_err(), "{bad} should not parse");
        }
    }
}
