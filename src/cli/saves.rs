//! Saves command implementation.

use super::{CliError, open_saves};
use std::path::PathBuf;
use tracing::info;

/// Execute the saves command.
///
/// # Errors
///
/// Returns an error if the save directory cannot be read or the named save
/// does not exist.
pub(crate) fn execute(dir: Option<PathBuf>, delete: Option<String>) -> Result<(), CliError> {
    let store = open_saves(dir)?;

    if let Some(name) = delete {
        store.delete(&name)?;
        info!(%name, "save deleted");
        println!("Deleted save '{name}'");
        return Ok(());
    }

    let names = store.list()?;
    println!("Saves in {}:", store.dir().display());
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        match store.load(&name) {
            Ok(snapshot) => println!(
                "  {name:<20} {:<8} turn {:>3}  score {:>5}",
                snapshot.mode, snapshot.turn_number, snapshot.score
            ),
            Err(e) => println!("  {name:<20} (unreadable: {e})"),
        }
    }

    Ok(())
}
