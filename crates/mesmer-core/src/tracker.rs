//! Progress and star persistence.
//!
//! Both trackers read fresh from storage on every query; nothing is cached
//! between calls. Concurrent writers on the same backend are last-write-wins.

use crate::progress::{Attempt, ProgressStore, QuizProgress};
use crate::statistics::{self, OverallSummary, QuizStatistics};
use crate::storage::Storage;

/// Storage key of the progress document.
pub const PROGRESS_KEY: &str = "mesmer_tigrinya_progress";

/// Storage key of the lifetime star total.
pub const STARS_KEY: &str = "mesmer_tigrinya_stars";

/// Reads and writes the progress document.
#[derive(Clone)]
pub struct ProgressTracker {
    storage: Storage,
}

impl ProgressTracker {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// The whole store. Empty when storage is unavailable or the document
    /// does not parse.
    pub fn read_all(&self) -> ProgressStore {
        let Some(data) = self.storage.read(PROGRESS_KEY) else {
            return ProgressStore::new();
        };
        match serde_json::from_str(&data) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("error reading progress data: {e}");
                ProgressStore::new()
            }
        }
    }

    /// Replace the stored document. `false` when it could not be written.
    pub fn write_all(&self, store: &ProgressStore) -> bool {
        match serde_json::to_string(store) {
            Ok(json) => self.storage.write(PROGRESS_KEY, &json),
            Err(e) => {
                tracing::warn!("error serializing progress data: {e}");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        self.storage.remove(PROGRESS_KEY)
    }

    /// Append an attempt to `quiz_id`'s history and persist the result.
    pub fn record_attempt(&self, quiz_id: &str, attempt: Attempt) -> bool {
        let percentage = attempt.percentage;
        let store = statistics::update_progress(self.read_all(), quiz_id, attempt);
        let saved = self.write_all(&store);
        if saved {
            tracing::info!(quiz_id, percentage, "recorded attempt");
        }
        saved
    }

    /// The record for `quiz_id`, or an empty one if it has never been played.
    pub fn quiz_progress(&self, quiz_id: &str) -> QuizProgress {
        self.read_all().get(quiz_id).cloned().unwrap_or_default()
    }

    pub fn is_quiz_completed(&self, quiz_id: &str) -> bool {
        self.quiz_progress(quiz_id).completed
    }

    pub fn overall_summary(&self) -> OverallSummary {
        statistics::overall_summary(&self.read_all())
    }

    pub fn quiz_statistics(&self, quiz_id: &str) -> QuizStatistics {
        statistics::quiz_statistics(&self.quiz_progress(quiz_id))
    }

    /// The whole store as pretty-printed JSON.
    pub fn export_progress(&self) -> String {
        serde_json::to_string_pretty(&self.read_all()).unwrap_or_else(|e| {
            tracing::warn!("error exporting progress data: {e}");
            "{}".to_string()
        })
    }

    /// Replace the store with an exported document.
    ///
    /// Text that does not parse, or whose records break the progress
    /// invariants, is rejected and the current store is left as it was.
    pub fn import_progress(&self, text: &str) -> bool {
        let store = match serde_json::from_str::<ProgressStore>(text) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("error importing progress data: {e}");
                return false;
            }
        };
        if let Err(e) = store.validate() {
            tracing::warn!("rejecting progress import: {e}");
            return false;
        }
        self.write_all(&store)
    }
}

/// Lifetime star total.
#[derive(Clone)]
pub struct StarTracker {
    storage: Storage,
}

impl StarTracker {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Stars earned so far. A missing or unparsable value counts as zero.
    pub fn total_stars(&self) -> u64 {
        self.storage
            .read(STARS_KEY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Add to the total and return the new total.
    ///
    /// The returned total is correct even when it could not be persisted.
    pub fn add_stars(&self, stars: u8) -> u64 {
        let total = self.total_stars() + u64::from(stars);
        if !self.storage.write(STARS_KEY, &total.to_string()) {
            tracing::warn!(total, "star total not saved");
        }
        total
    }
}
