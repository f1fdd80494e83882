//! The `mesmer export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::Session;

pub fn execute(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let json = session.progress().export_progress();
    match output {
        Some(path) => {
            std::fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Progress exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
