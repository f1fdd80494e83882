//! The `mesmer sound` command.

use anyhow::Result;
use clap::ValueEnum;

use super::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SoundAction {
    On,
    Off,
    Status,
}

pub fn execute(session: &Session, action: SoundAction) -> Result<()> {
    let sound = session.sound();
    let enabled = match action {
        SoundAction::On | SoundAction::Off => {
            let enabled = action == SoundAction::On;
            if !sound.set_enabled(enabled) {
                eprintln!("Warning: sound preference could not be saved.");
            }
            enabled
        }
        SoundAction::Status => sound.is_enabled(),
    };
    println!("Sound is {}", if enabled { "on" } else { "off" });
    Ok(())
}
