//! What a quiz page does once a run finishes.
//!
//! The run-loops never touch storage. The page takes the [`Outcome`] from its
//! finish hook and hands it to [`complete_quiz`], which records the attempt
//! and awards stars.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::hooks::Outcome;
use crate::progress::Attempt;
use crate::statistics::{self, QuizStatistics, MAX_STARS};
use crate::tracker::{ProgressTracker, StarTracker};

/// Star slots shown for an award; a sixth (bonus) star is drawn after them.
pub const STAR_SLOTS: u8 = 5;

/// Everything the result screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub quiz_id: String,
    pub attempt: Attempt,
    pub stars_earned: u8,
    pub total_stars: u64,
    /// Whether the attempt reached storage.
    pub saved: bool,
    pub statistics: QuizStatistics,
}

/// Record a finished run of `quiz_id` and award its stars.
pub fn complete_quiz(
    progress: &ProgressTracker,
    stars: &StarTracker,
    quiz_id: &str,
    outcome: &Outcome,
    metadata: BTreeMap<String, serde_json::Value>,
    now: DateTime<Utc>,
) -> CompletionReport {
    let attempt = Attempt::new(
        outcome.score,
        outcome.total,
        outcome.time_taken,
        now,
        metadata,
    );
    let saved = progress.record_attempt(quiz_id, attempt.clone());
    if !saved {
        tracing::warn!(quiz_id, "attempt not saved");
    }

    let stars_earned = statistics::stars_for(
        outcome.score,
        outcome.total,
        outcome.time_taken.as_duration(),
    );
    let total_stars = stars.add_stars(stars_earned);

    let statistics = if saved {
        progress.quiz_statistics(quiz_id)
    } else {
        // Storage is down; report this run alone.
        let local = statistics::update_progress(Default::default(), quiz_id, attempt.clone());
        local
            .get(quiz_id)
            .map(statistics::quiz_statistics)
            .unwrap_or_default()
    };

    CompletionReport {
        quiz_id: quiz_id.to_string(),
        attempt,
        stars_earned,
        total_stars,
        saved,
        statistics,
    }
}

/// `★★★☆☆`, plus a trailing `★` for the bonus star.
pub fn star_display(stars: u8) -> String {
    let stars = stars.min(MAX_STARS);
    let filled = stars.min(STAR_SLOTS);
    let mut out = String::new();
    for slot in 0..STAR_SLOTS {
        out.push(if slot < filled { '★' } else { '☆' });
    }
    for _ in STAR_SLOTS..stars {
        out.push('★');
    }
    out
}
