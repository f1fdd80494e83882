//! The `mesmer validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mesmer_core::parser::{self, ValidationWarning};

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let files = if quiz_path.is_dir() {
        parser::load_quiz_directory(&quiz_path)?
    } else {
        vec![parser::parse_quiz(&quiz_path)?]
    };

    let warnings = parser::validate_quiz_set(&files);

    for file in &files {
        let quiz = &file.definition;
        println!(
            "Quiz: {} ({} {}, {} items)",
            quiz.title,
            quiz.id,
            quiz.content.kind(),
            quiz.content.len()
        );
        for w in warnings.iter().filter(|w| w.quiz_id == quiz.id) {
            print_warning(w);
        }
    }

    if warnings.is_empty() {
        println!("All quizzes valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}

fn print_warning(w: &ValidationWarning) {
    let prefix = w
        .item
        .map(|i| format!("  [#{}]", i + 1))
        .unwrap_or_else(|| "  ".to_string());
    println!("{prefix} WARNING: {}", w.message);
}
