//! Quiz run-loops.
//!
//! One run-loop drives one page: [`choice::ChoiceQuiz`] for multiple choice,
//! [`build::BuildQuiz`] for drag-and-drop word building, and
//! [`memory::MemoryGame`] for pair matching. Each owns its hooks, a
//! [`Timers`](crate::clock::Timers) queue for delayed transitions, and an
//! [`EngineContext`] with the injected clock, sound player, and RNG.

pub mod build;
pub mod choice;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::hooks::{Position, ScoreSnapshot};
use crate::sound::{NoSound, SoundPlayer};

/// Animation delays between a judgement and the next transition, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Pause after a correct pick so the celebration can play.
    pub choice_correct_advance: u64,
    /// Pause after a wrong pick. Zero: move straight on.
    pub choice_incorrect_advance: u64,
    pub build_correct_advance: u64,
    /// Pause between the second flip and the match check.
    pub memory_flip_resolve: u64,
    pub memory_match_clear: u64,
    pub memory_mismatch_reset: u64,
    pub memory_finish_celebration: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            choice_correct_advance: 600,
            choice_incorrect_advance: 0,
            build_correct_advance: 1000,
            memory_flip_resolve: 300,
            memory_match_clear: 500,
            memory_mismatch_reset: 1000,
            memory_finish_celebration: 1000,
        }
    }
}

impl Timings {
    /// Every delay zero, for scripted sessions.
    pub fn immediate() -> Self {
        Self {
            choice_correct_advance: 0,
            choice_incorrect_advance: 0,
            build_correct_advance: 0,
            memory_flip_resolve: 0,
            memory_match_clear: 0,
            memory_mismatch_reset: 0,
            memory_finish_celebration: 0,
        }
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Services a run-loop depends on.
pub struct EngineContext {
    pub clock: Arc<dyn Clock>,
    pub sound: Arc<dyn SoundPlayer>,
    pub timings: Timings,
    pub rng: StdRng,
}

impl EngineContext {
    pub fn new(clock: Arc<dyn Clock>, sound: Arc<dyn SoundPlayer>) -> Self {
        Self {
            clock,
            sound,
            timings: Timings::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Make shuffles reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()), Arc::new(NoSound))
    }
}

/// What a driver needs to run any quiz kind to completion.
pub trait RunLoop {
    /// Fire every scheduled task that is due. Returns how many fired.
    fn tick(&mut self) -> usize;

    /// Time until the next scheduled task, if any is pending.
    fn time_until_next(&self) -> Option<Duration>;

    fn is_finished(&self) -> bool;

    fn score(&self) -> ScoreSnapshot;

    fn progress(&self) -> Position;

    /// Back to the first question with score and timer reset.
    /// Pending tasks are dropped. Persisted history is untouched.
    fn restart(&mut self);
}
