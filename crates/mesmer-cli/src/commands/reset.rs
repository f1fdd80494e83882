//! The `mesmer reset` command.

use anyhow::Result;

use super::Session;

pub fn execute(session: &Session) -> Result<()> {
    session.require_storage()?;
    if !session.progress().clear() {
        anyhow::bail!("failed to clear progress");
    }
    println!("Progress cleared.");
    Ok(())
}
