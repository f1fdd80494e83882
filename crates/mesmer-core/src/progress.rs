//! Persisted progress records.
//!
//! The field names serialize in camelCase so the stored document keeps the
//! shape the website has always written (`bestScore`, `lastAttempt`, ...).

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProgressError;
use crate::statistics::{percentage, COMPLETION_THRESHOLD};

/// Maximum number of attempts kept per quiz; older ones are evicted first.
pub const MAX_ATTEMPTS: usize = 10;

/// Elapsed time of one run, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeTaken {
    pub minutes: u64,
    pub seconds: u64,
    /// Whole run in milliseconds.
    #[serde(rename = "total")]
    pub total_ms: u64,
}

impl TimeTaken {
    pub fn from_millis(total_ms: u64) -> Self {
        Self {
            minutes: total_ms / 60_000,
            seconds: (total_ms % 60_000) / 1000,
            total_ms,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }
}

impl From<Duration> for TimeTaken {
    fn from(d: Duration) -> Self {
        Self::from_millis(d.as_millis() as u64)
    }
}

impl fmt::Display for TimeTaken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minutes > 0 {
            write!(f, "{}m {}s", self.minutes, self.seconds)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

/// One completed run of a quiz. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub score: u32,
    pub total: u32,
    /// `round(100 * score / total)`, 0..=100.
    pub percentage: u8,
    pub time_taken: TimeTaken,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Attempt {
    pub fn new(
        score: u32,
        total: NonZeroU32,
        time_taken: TimeTaken,
        timestamp: DateTime<Utc>,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            score,
            total: total.get(),
            percentage: percentage(score, total),
            time_taken,
            timestamp,
            metadata,
        }
    }
}

/// Progress of one quiz across attempts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizProgress {
    /// Set once `best_score` reaches the completion threshold; never reverts.
    pub completed: bool,
    /// Most recent attempts, oldest first, at most [`MAX_ATTEMPTS`].
    pub attempts: Vec<Attempt>,
    /// Highest percentage ever recorded, including evicted attempts.
    pub best_score: u8,
    pub last_attempt: Option<Attempt>,
}

/// All quiz progress, keyed by quiz identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    quizzes: BTreeMap<String, QuizProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, quiz_id: &str) -> Option<&QuizProgress> {
        self.quizzes.get(quiz_id)
    }

    /// The record for `quiz_id`, created empty if missing.
    pub fn entry(&mut self, quiz_id: &str) -> &mut QuizProgress {
        self.quizzes.entry(quiz_id.to_string()).or_default()
    }

    pub fn insert(&mut self, quiz_id: &str, progress: QuizProgress) {
        self.quizzes.insert(quiz_id.to_string(), progress);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QuizProgress)> {
        self.quizzes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// Check every record against the rules `update_progress` maintains.
    ///
    /// Percentages and best scores stay within 0..=100, every attempt has a
    /// non-zero total and is no better than the best score, and `completed`
    /// agrees with the best score.
    pub fn validate(&self) -> Result<(), ProgressError> {
        self.iter().try_for_each(|(id, p)| p.validate(id))
    }
}

impl QuizProgress {
    fn validate(&self, quiz_id: &str) -> Result<(), ProgressError> {
        let best_score = self.best_score;
        if best_score > 100 {
            return Err(ProgressError::BestScoreOutOfRange {
                quiz_id: quiz_id.to_string(),
                best_score,
            });
        }
        if self.completed != (best_score >= COMPLETION_THRESHOLD) {
            return Err(ProgressError::CompletedMismatch {
                quiz_id: quiz_id.to_string(),
                completed: self.completed,
                best_score,
            });
        }
        for attempt in self.attempts.iter().chain(&self.last_attempt) {
            if attempt.total == 0 {
                return Err(ProgressError::ZeroTotal {
                    quiz_id: quiz_id.to_string(),
                });
            }
            if attempt.percentage > 100 {
                return Err(ProgressError::PercentageOutOfRange {
                    quiz_id: quiz_id.to_string(),
                    percentage: attempt.percentage,
                });
            }
            if attempt.percentage > best_score {
                return Err(ProgressError::AttemptAboveBest {
                    quiz_id: quiz_id.to_string(),
                    percentage: attempt.percentage,
                    best_score,
                });
            }
        }
        Ok(())
    }
}
