//! Hooks the run-loops call into.
//!
//! A page (terminal view, test recorder, ...) implements one of the
//! per-kind traits. The run-loops never render anything themselves; they
//! only report state transitions through these calls.

use std::num::NonZeroU32;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::build::BuildView;
use crate::engine::choice::ChoiceView;
use crate::engine::memory::MemoryView;
use crate::model::Question;
use crate::progress::TimeTaken;
use crate::statistics::percentage;

// ---------------------------------------------------------------------------
// Results reported to hooks
// ---------------------------------------------------------------------------

/// What happened to an answer-like input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Incorrect,
    /// The input arrived while the run-loop was not accepting it.
    Ignored,
}

impl Answer {
    pub fn from_bool(correct: bool) -> Self {
        if correct {
            Answer::Correct
        } else {
            Answer::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Answer::Correct
    }
}

/// Final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub score: u32,
    pub total: NonZeroU32,
    pub percentage: u8,
    pub time_taken: TimeTaken,
}

impl Outcome {
    pub fn new(score: u32, total: NonZeroU32, elapsed: Duration) -> Self {
        Self {
            score,
            total,
            percentage: percentage(score, total),
            time_taken: TimeTaken::from(elapsed),
        }
    }
}

/// Score so far, as returned by `score()` on every run-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub score: u32,
    pub total: u32,
    pub percentage: u8,
}

/// Position in the run, as returned by `progress()` on every run-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based for question quizzes, matches so far for the memory game.
    pub current: u32,
    pub total: u32,
    pub percentage: u8,
}

// ---------------------------------------------------------------------------
// Hook traits
// ---------------------------------------------------------------------------

/// Calls shared by every quiz kind.
pub trait QuizHooks {
    /// An answer, build check, or card pair was judged.
    fn on_answer(&mut self, _correct: bool) {}

    /// The run reached its terminal state.
    fn on_finish(&mut self, outcome: &Outcome);
}

/// Multiple-choice rendering.
///
/// The default `present` calls the three finer-grained hooks in order, so a
/// page can implement either level.
pub trait ChoiceHooks: QuizHooks {
    fn present(&mut self, view: &ChoiceView<'_>) {
        self.set_header(view.index + 1, view.total);
        self.render_prompt(view.question);
        self.render_choices(view.question);
    }

    fn set_header(&mut self, _current: usize, _total: usize) {}
    fn render_prompt(&mut self, _question: &Question) {}
    fn render_choices(&mut self, _question: &Question) {}
}

/// Word-building rendering. `present` runs on every change to the tiles.
pub trait BuildHooks: QuizHooks {
    fn present(&mut self, view: &BuildView<'_>);

    /// The assembled word was wrong; play the transient shake.
    fn shake(&mut self) {}
}

/// Memory-game rendering. `present` runs on every change to the board.
pub trait MemoryHooks: QuizHooks {
    fn present(&mut self, view: &MemoryView<'_>);
}
