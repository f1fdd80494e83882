//! The `mesmer import` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::Session;

pub fn execute(session: &Session, file: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    session.require_storage()?;

    let tracker = session.progress();
    if !tracker.import_progress(&text) {
        anyhow::bail!("{} is not a valid progress export", file.display());
    }
    println!(
        "Imported progress for {} quiz(zes).",
        tracker.read_all().len()
    );
    Ok(())
}
