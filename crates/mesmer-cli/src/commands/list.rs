//! The `mesmer list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mesmer_core::parser;

use super::Session;

pub fn execute(session: &Session, quiz_dir: Option<PathBuf>) -> Result<()> {
    let dir = quiz_dir.unwrap_or_else(|| session.config.quiz_dir.clone());
    if !dir.is_dir() {
        println!(
            "No quiz directory at {}. Run `mesmer init` to create one.",
            dir.display()
        );
        return Ok(());
    }

    let files = parser::load_quiz_directory(&dir)?;
    if files.is_empty() {
        println!("No quizzes found in {}.", dir.display());
        return Ok(());
    }

    let tracker = session.progress();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Kind", "Items", "Completed", "Best"]);
    for file in &files {
        let quiz = &file.definition;
        let progress = tracker.quiz_progress(&quiz.id);
        let best = if progress.attempts.is_empty() && progress.best_score == 0 {
            String::new()
        } else {
            format!("{}%", progress.best_score)
        };
        table.add_row(vec![
            Cell::new(&quiz.id),
            Cell::new(&quiz.title),
            Cell::new(quiz.content.kind()),
            Cell::new(quiz.content.len()),
            Cell::new(if progress.completed { "✓" } else { "" }),
            Cell::new(best),
        ]);
    }
    println!("{table}");
    println!("{} quiz(zes) in {}", files.len(), dir.display());

    Ok(())
}
