//! The `mesmer play` command.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use mesmer_core::clock::SystemClock;
use mesmer_core::engine::build::{insertion_index, BuildQuiz, TileBox, TileId, Zone};
use mesmer_core::engine::choice::ChoiceQuiz;
use mesmer_core::engine::memory::{Flip, MemoryGame};
use mesmer_core::engine::{EngineContext, RunLoop, Timings};
use mesmer_core::error::DragError;
use mesmer_core::hooks::{Answer, Outcome};
use mesmer_core::model::{QuizContent, QuizKind};
use mesmer_core::page::{complete_quiz, star_display, CompletionReport};
use mesmer_core::parser;

use super::Session;
use crate::terminal::TerminalView;

type Input = Lines<BufReader<Stdin>>;

pub async fn execute(
    session: &Session,
    quiz_path: PathBuf,
    seed: Option<u64>,
    fast: bool,
) -> Result<()> {
    let file = parser::parse_quiz(&quiz_path)?;
    for w in parser::validate_quiz(&file) {
        eprintln!("WARNING: {}", w.message);
    }
    let quiz = file.definition;
    let kind = quiz.content.kind();

    let timings = if fast {
        Timings::immediate()
    } else {
        session.config.timings
    };
    let mut ctx = EngineContext::new(Arc::new(SystemClock::new()), Arc::new(session.sound()))
        .with_timings(timings);
    if let Some(seed) = seed {
        ctx = ctx.with_seed(seed);
    }
    let view = TerminalView::new(kind, seed);

    println!("{}", quiz.title);
    if !quiz.description.is_empty() {
        println!("{}", quiz.description);
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let outcome = match quiz.content {
        QuizContent::Choice(questions) => {
            play_choice(ChoiceQuiz::new(questions, view, ctx)?, &mut input).await?
        }
        QuizContent::Build(words) => {
            play_build(BuildQuiz::new(words, view, ctx)?, &mut input).await?
        }
        QuizContent::Memory(pairs) => {
            play_memory(MemoryGame::new(pairs, view, ctx)?, &mut input).await?
        }
    };

    let Some(outcome) = outcome else {
        println!("\nQuiz stopped before the end; nothing was recorded.");
        return Ok(());
    };

    let mut metadata = BTreeMap::new();
    metadata.insert("kind".to_string(), serde_json::json!(kind.to_string()));
    let report = complete_quiz(
        &session.progress(),
        &session.stars(),
        &quiz.id,
        &outcome,
        metadata,
        Utc::now(),
    );
    print_report(kind, &report);
    Ok(())
}

/// Fire due tasks until nothing is pending, sleeping through the delays.
async fn settle(run: &mut impl RunLoop) {
    run.tick();
    while let Some(wait) = run.time_until_next() {
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        run.tick();
    }
}

/// Next non-empty input line, or `None` at end of input.
async fn next_command(input: &mut Input) -> Result<Option<String>> {
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        match input.next_line().await? {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => return Ok(Some(line.trim().to_string())),
            None => {
                println!();
                return Ok(None);
            }
        }
    }
}

/// A 1-based position, if `text` is one within `len`.
fn position(text: &str, len: usize) -> Option<usize> {
    text.parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

async fn play_choice(
    mut quiz: ChoiceQuiz<TerminalView>,
    input: &mut Input,
) -> Result<Option<Outcome>> {
    println!("Type a choice number or its text. h = hint, s = skip, q = quit.");
    loop {
        settle(&mut quiz).await;
        if let Some(outcome) = quiz.outcome() {
            return Ok(Some(*outcome));
        }
        let Some(line) = next_command(input).await? else {
            return Ok(None);
        };

        match line.as_str() {
            "q" => return Ok(None),
            "h" => match quiz.use_hint() {
                Some(removed) => println!(
                    "  💡 It is not {removed}. ({} hint(s) left)",
                    quiz.power_ups().hints
                ),
                None => println!("  No hint available."),
            },
            "s" => {
                if quiz.skip() {
                    println!("  ⏭ Skipped. ({} skip(s) left)", quiz.power_ups().skips);
                } else {
                    println!("  No skips left.");
                }
            }
            _ => {
                let choice = quiz
                    .current_question()
                    .and_then(|q| position(&line, q.choices.len()).map(|i| q.choices[i].clone()))
                    .unwrap_or_else(|| line.clone());
                if quiz.pick(&choice) == Answer::Ignored {
                    println!("  {choice} cannot be picked now.");
                }
            }
        }
    }
}

async fn play_build(
    mut quiz: BuildQuiz<TerminalView>,
    input: &mut Input,
) -> Result<Option<Outcome>> {
    println!(
        "Type a bank tile (number or text) to drop it, b N to send drop tile N back, \
         m N M to move drop tile N to place M, c to check, q to quit."
    );
    loop {
        settle(&mut quiz).await;
        if let Some(outcome) = quiz.outcome() {
            return Ok(Some(*outcome));
        }
        let Some(line) = next_command(input).await? else {
            return Ok(None);
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        let drop = quiz.zone(Zone::Drop).to_vec();
        let result = match words.as_slice() {
            ["q"] => return Ok(None),
            ["c"] => {
                if quiz.check_answer() == Answer::Ignored {
                    println!("  Wait for the next word.");
                }
                Ok(())
            }
            ["b", n] => match position(n, drop.len()) {
                Some(i) => quiz.move_item(drop[i], Zone::Drop, Zone::Bank, usize::MAX),
                None => {
                    println!("  No drop tile {n}.");
                    Ok(())
                }
            },
            ["m", from, to] => match (position(from, drop.len()), to.parse::<usize>()) {
                (Some(i), Ok(to)) if to >= 1 => drag_to_row(&mut quiz, drop[i], to - 1),
                _ => {
                    println!("  Usage: m <drop tile> <new place>");
                    Ok(())
                }
            },
            _ => match bank_tile(&quiz, &line) {
                Some(tile) => quiz.move_item(tile, Zone::Bank, Zone::Drop, usize::MAX),
                None => {
                    println!("  No tile {line} in the bank.");
                    Ok(())
                }
            },
        };
        if let Err(e) = result {
            println!("  {e}");
        }
    }
}

/// Drag `tile` inside the drop zone so it lands on row `row`, with the other
/// drop tiles laid out one per row.
fn drag_to_row(
    quiz: &mut BuildQuiz<TerminalView>,
    tile: TileId,
    row: usize,
) -> Result<(), DragError> {
    let others = quiz.zone(Zone::Drop).len().saturating_sub(1);
    let rows: Vec<TileBox> = (0..others)
        .map(|k| TileBox {
            top: k as f32,
            height: 1.0,
        })
        .collect();
    let at = insertion_index(&rows, row as f32);
    quiz.begin_drag(tile)?;
    quiz.drop_dragged(Zone::Drop, at)
}

/// Bank tile by 1-based position or by its text.
fn bank_tile(quiz: &BuildQuiz<TerminalView>, text: &str) -> Option<TileId> {
    let bank = quiz.zone(Zone::Bank);
    if let Some(i) = position(text, bank.len()) {
        return Some(bank[i]);
    }
    bank.iter()
        .copied()
        .find(|&id| quiz.tile_text(id) == Some(text))
}

async fn play_memory(
    mut game: MemoryGame<TerminalView>,
    input: &mut Input,
) -> Result<Option<Outcome>> {
    println!("Type a card number to turn it over, q to quit.");
    loop {
        settle(&mut game).await;
        if let Some(outcome) = game.outcome() {
            return Ok(Some(*outcome));
        }
        let Some(line) = next_command(input).await? else {
            return Ok(None);
        };
        if line == "q" {
            return Ok(None);
        }

        let flipped = position(&line, game.tiles().len()).map(|i| game.flip(i));
        if matches!(flipped, None | Some(Flip::Ignored)) {
            println!("  Card {line} cannot be turned over now.");
        }
    }
}

fn print_report(kind: QuizKind, report: &CompletionReport) {
    let attempt = &report.attempt;
    println!();
    match kind {
        QuizKind::Memory => println!("You matched {} pairs!", attempt.score),
        _ => println!(
            "You got {} out of {} correct! ({}%)",
            attempt.score, attempt.total, attempt.percentage
        ),
    }
    println!("Time taken: {}", attempt.time_taken);
    println!(
        "Stars: {} (+{}, {} total)",
        star_display(report.stars_earned),
        report.stars_earned,
        report.total_stars
    );
    println!(
        "Best score: {}% over {} attempt(s){}",
        report.statistics.best_score,
        report.statistics.attempts,
        if report.statistics.completed {
            ", completed ✓"
        } else {
            ""
        }
    );
    if !report.saved {
        println!("Progress could not be saved.");
    }
}
