//! Terminal rendering of the quiz hooks, and a bell for sound effects.

use std::io::Write;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mesmer_core::engine::build::{BuildView, TileId};
use mesmer_core::engine::choice::ChoiceView;
use mesmer_core::engine::memory::MemoryView;
use mesmer_core::error::SoundError;
use mesmer_core::hooks::{BuildHooks, ChoiceHooks, MemoryHooks, Outcome, QuizHooks};
use mesmer_core::messages;
use mesmer_core::model::{Question, QuizKind};
use mesmer_core::sound::AudioSink;

/// Prints every state change of a run to stdout.
pub struct TerminalView {
    kind: QuizKind,
    rng: StdRng,
    /// Word whose header was printed last.
    shown_word: Option<usize>,
}

impl TerminalView {
    pub fn new(kind: QuizKind, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            kind,
            rng,
            shown_word: None,
        }
    }
}

impl QuizHooks for TerminalView {
    fn on_answer(&mut self, correct: bool) {
        let icon = if correct { "✅" } else { "❌" };
        let message = match self.kind {
            QuizKind::Memory if correct => messages::MATCH_FOUND,
            QuizKind::Memory => messages::TRY_AGAIN,
            _ => messages::feedback(correct, &mut self.rng),
        };
        println!("  {icon} {message}");
    }

    fn on_finish(&mut self, _outcome: &Outcome) {
        println!("\n🎉 {}", messages::pick(messages::ENCOURAGEMENT, &mut self.rng));
    }
}

impl ChoiceHooks for TerminalView {
    fn present(&mut self, view: &ChoiceView<'_>) {
        self.set_header(view.index + 1, view.total);
        self.render_prompt(view.question);
        for (i, choice) in view.question.choices.iter().enumerate() {
            if view.eliminated.contains(choice) {
                println!("  [{}] ·", i + 1);
            } else {
                println!("  [{}] {choice}", i + 1);
            }
        }
    }

    fn set_header(&mut self, current: usize, total: usize) {
        println!("\nQuestion {current} of {total}");
    }

    fn render_prompt(&mut self, question: &Question) {
        println!("  {}", question.prompt);
    }
}

fn tile_list(view: &BuildView<'_>, ids: &[TileId]) -> String {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| format!("[{}] {}", i + 1, view.tile(id)))
        .collect::<Vec<_>>()
        .join("  ")
}

impl BuildHooks for TerminalView {
    fn present(&mut self, view: &BuildView<'_>) {
        if !view.accepting {
            return;
        }
        if self.shown_word != Some(view.index) {
            self.shown_word = Some(view.index);
            println!("\nWord {} of {}: {}", view.index + 1, view.total, view.question.word);
        }
        println!("  Bank: {}", tile_list(view, view.bank));
        println!("  Drop: {}", tile_list(view, view.drop));
    }

    fn shake(&mut self) {
        println!("  〰 Not quite. Keep arranging the tiles.");
    }
}

impl MemoryHooks for TerminalView {
    fn present(&mut self, view: &MemoryView<'_>) {
        let cells: Vec<String> = view
            .tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| {
                let face = if tile.matched {
                    format!("✓{}", tile.card.value)
                } else if tile.flipped {
                    tile.card.value.clone()
                } else {
                    "?".to_string()
                };
                format!("[{}] {face}", i + 1)
            })
            .collect();
        println!("  {}   ({}/{} pairs)", cells.join("  "), view.matches, view.pairs);
    }
}

/// Rings the terminal bell for any sound whose asset file exists.
pub struct TerminalSink;

impl AudioSink for TerminalSink {
    fn play(&self, asset: &Path, _volume: f32) -> Result<(), SoundError> {
        if !asset.is_file() {
            return Err(SoundError::AssetMissing(asset.display().to_string()));
        }
        let mut err = std::io::stderr();
        err.write_all(b"\x07")
            .and_then(|_| err.flush())
            .map_err(|e| SoundError::Playback(e.to_string()))
    }
}
