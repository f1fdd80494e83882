//! Scoring and progress statistics.
//!
//! Everything here is pure: no storage, no clock. The run-loops use
//! [`percentage`] for their final score, and progress views use the
//! aggregate functions over a [`ProgressStore`].

use std::num::NonZeroU32;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::progress::{Attempt, ProgressStore, QuizProgress, MAX_ATTEMPTS};

/// Best score (percent) at which a quiz counts as completed.
pub const COMPLETION_THRESHOLD: u8 = 70;

/// Upper bound for a star award, including the speed bonus.
pub const MAX_STARS: u8 = 6;

/// Runs faster than this earn a bonus star when the score is high enough.
pub const SPEED_BONUS_WINDOW: Duration = Duration::from_secs(30);

/// Integer division rounding halves up, for non-negative operands.
fn div_round(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// `round(100 * score / total)`.
///
/// A score above `total` is clamped, so the result is always in `0..=100`.
pub fn percentage(score: u32, total: NonZeroU32) -> u8 {
    let total = u64::from(total.get());
    let score = u64::from(score).min(total);
    div_round(100 * score, total) as u8
}

/// Star award for a finished run.
///
/// 100% earns 5 stars, 80% 4, 60% 3, 40% 2, anything else 1. A run of at
/// least 80% finished inside [`SPEED_BONUS_WINDOW`] earns one more, capped at
/// [`MAX_STARS`]. Tiers compare the exact ratio, not the rounded percentage,
/// so 199 of 200 is not a perfect run.
pub fn stars_for(score: u32, total: NonZeroU32, elapsed: Duration) -> u8 {
    let total = u64::from(total.get());
    let score = u64::from(score).min(total);
    let reaches = |pct: u64| 100 * score >= pct * total;

    let base = if reaches(100) {
        5
    } else if reaches(80) {
        4
    } else if reaches(60) {
        3
    } else if reaches(40) {
        2
    } else {
        1
    };
    let bonus = u8::from(elapsed < SPEED_BONUS_WINDOW && reaches(80));
    (base + bonus).min(MAX_STARS)
}

/// Fold one attempt into a quiz's record.
///
/// The best score is a running maximum, and `completed` follows it, so a
/// weaker later attempt never undoes either. History keeps the most recent
/// [`MAX_ATTEMPTS`] entries. Does not persist anything.
pub fn update_progress(mut store: ProgressStore, quiz_id: &str, attempt: Attempt) -> ProgressStore {
    let progress = store.entry(quiz_id);
    progress.best_score = progress.best_score.max(attempt.percentage);
    progress.completed = progress.best_score >= COMPLETION_THRESHOLD;
    progress.last_attempt = Some(attempt.clone());
    progress.attempts.push(attempt);
    if progress.attempts.len() > MAX_ATTEMPTS {
        let excess = progress.attempts.len() - MAX_ATTEMPTS;
        progress.attempts.drain(..excess);
    }
    store
}

/// Completion across every quiz with a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_quizzes: usize,
    pub completed_quizzes: usize,
    pub overall_percentage: u8,
    /// Sum of best scores.
    pub total_score: u64,
    /// 100 per quiz.
    pub max_score: u64,
    pub completion_rate: u8,
}

/// Aggregate completion over a whole store. An empty store yields all zeros.
pub fn overall_summary(store: &ProgressStore) -> OverallSummary {
    if store.is_empty() {
        return OverallSummary::default();
    }

    let total_quizzes = store.len();
    let completed_quizzes = store.iter().filter(|(_, p)| p.completed).count();
    let total_score: u64 = store.iter().map(|(_, p)| u64::from(p.best_score)).sum();
    let max_score = 100 * total_quizzes as u64;

    OverallSummary {
        total_quizzes,
        completed_quizzes,
        overall_percentage: div_round(100 * total_score, max_score) as u8,
        total_score,
        max_score,
        completion_rate: div_round(100 * completed_quizzes as u64, total_quizzes as u64) as u8,
    }
}

/// Per-quiz statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatistics {
    pub attempts: usize,
    pub best_score: u8,
    /// Rounded mean percentage over the kept history; 0 without attempts.
    pub average_score: u8,
    pub last_attempt: Option<Attempt>,
    pub completed: bool,
}

pub fn quiz_statistics(progress: &QuizProgress) -> QuizStatistics {
    let attempts = progress.attempts.len();
    let average_score = if attempts == 0 {
        0
    } else {
        let sum: u64 = progress
            .attempts
            .iter()
            .map(|a| u64::from(a.percentage))
            .sum();
        div_round(sum, attempts as u64) as u8
    };

    QuizStatistics {
        attempts,
        best_score: progress.best_score,
        average_score,
        last_attempt: progress.last_attempt.clone(),
        completed: progress.completed,
    }
}
