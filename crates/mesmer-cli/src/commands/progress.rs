//! The `mesmer progress` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use mesmer_core::statistics::{self, QuizStatistics};

use super::Session;

pub fn execute(session: &Session, quiz: Option<String>, format: String) -> Result<()> {
    let tracker = session.progress();
    let total_stars = session.stars().total_stars();

    match (format.as_str(), quiz) {
        ("json", Some(id)) => {
            let stats = tracker.quiz_statistics(&id);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        ("json", None) => {
            let store = tracker.read_all();
            let quizzes: serde_json::Map<String, serde_json::Value> = store
                .iter()
                .map(|(id, p)| {
                    serde_json::to_value(statistics::quiz_statistics(p))
                        .map(|v| (id.to_string(), v))
                })
                .collect::<Result<_, _>>()?;
            let doc = serde_json::json!({
                "summary": statistics::overall_summary(&store),
                "totalStars": total_stars,
                "quizzes": quizzes,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        ("text", Some(id)) => print_quiz(&id, &tracker.quiz_statistics(&id)),
        ("text", None) => {
            let store = tracker.read_all();
            if store.is_empty() {
                println!("No progress saved yet. Play a quiz with `mesmer play --quiz <file>`.");
            } else {
                let mut table = Table::new();
                table.set_header(vec![
                    "Quiz",
                    "Completed",
                    "Best",
                    "Attempts",
                    "Average",
                    "Last played",
                ]);
                for (id, progress) in store.iter() {
                    let stats = statistics::quiz_statistics(progress);
                    table.add_row(vec![
                        Cell::new(id),
                        Cell::new(if stats.completed { "✓" } else { "" }),
                        Cell::new(format!("{}%", stats.best_score)),
                        Cell::new(stats.attempts),
                        Cell::new(format!("{}%", stats.average_score)),
                        Cell::new(last_played(&stats)),
                    ]);
                }
                println!("{table}");
            }

            let summary = statistics::overall_summary(&store);
            println!(
                "\nCompleted {} of {} quizzes ({}%), overall score {}%.",
                summary.completed_quizzes,
                summary.total_quizzes,
                summary.completion_rate,
                summary.overall_percentage
            );
            println!("Total stars: {total_stars}");
        }
        (other, _) => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn print_quiz(id: &str, stats: &QuizStatistics) {
    println!("Quiz: {id}");
    if stats.attempts == 0 {
        println!("  Not played yet.");
        return;
    }
    println!("  Completed: {}", if stats.completed { "yes" } else { "no" });
    println!("  Best score: {}%", stats.best_score);
    println!("  Average score: {}%", stats.average_score);
    println!("  Attempts: {}", stats.attempts);
    if let Some(last) = &stats.last_attempt {
        println!(
            "  Last attempt: {}/{} ({}%) in {} on {}",
            last.score,
            last.total,
            last.percentage,
            last.time_taken,
            last.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}

fn last_played(stats: &QuizStatistics) -> String {
    stats
        .last_attempt
        .as_ref()
        .map(|a| a.timestamp.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
