//! The `mesmer init` command.

use std::path::Path;

use anyhow::Result;

use mesmer_storage::config::{CONFIG_FILE, SAMPLE_CONFIG};

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE).exists() {
        println!("{CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE}");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add sound files under ./audio (optional)");
    println!("  2. Run: mesmer validate --quiz quizzes/example.toml");
    println!("  3. Run: mesmer play --quiz quizzes/example.toml");

    Ok(())
}

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "First Words"
description = "Pick the English meaning of each Tigrinya word"
kind = "choice"

[[questions]]
prompt = "ሰላም"
choices = ["Hello", "Water", "House", "Thank you"]
correct = "Hello"

[[questions]]
prompt = "ማይ"
choices = ["Bread", "Water", "Milk", "Coffee"]
correct = "Water"

[[questions]]
prompt = "ቤት"
choices = ["School", "Tree", "House", "Road"]
correct = "House"
"#;
