//! Error types for quiz content, storage, sound, and drag interactions.
//!
//! Only [`QuizError`] and [`DragError`] ever reach callers of the run-loops.
//! Storage and sound failures are caught where they happen and degrade to
//! empty reads, `false` returns, or a logged fallback message.

use thiserror::Error;

/// Invalid quiz content, detected when a run-loop is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The quiz has nothing to ask.
    #[error("quiz has no questions")]
    NoQuestions,

    /// A memory game was built from an empty pair list.
    #[error("memory game has no pairs")]
    NoPairs,

    /// The correct answer of a multiple-choice question is not one of its choices.
    #[error("question {index}: correct answer '{correct}' is not among the choices")]
    CorrectAnswerMissing { index: usize, correct: String },

    /// A word-building question has no tiles to drag.
    #[error("question {index}: no tiles for word '{word}'")]
    NoTiles { index: usize, word: String },

    /// The tiles of a word-building question cannot assemble the target word.
    #[error("question {index}: tiles {tiles:?} do not spell '{word}'")]
    TilesDoNotSpellWord {
        index: usize,
        word: String,
        tiles: Vec<String>,
    },
}

/// Failures of a key-value storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is disabled or blocked.
    #[error("storage backend unavailable")]
    Unavailable,

    /// Writing the value would exceed the backend's quota.
    #[error("storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: u64, limit: u64 },

    /// The key cannot be stored by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// An I/O error from a file-backed store.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while playing a sound effect.
#[derive(Debug, Error)]
pub enum SoundError {
    /// The audio asset could not be found.
    #[error("audio asset not found: {0}")]
    AssetMissing(String),

    /// The asset exists but could not be played.
    #[error("playback failed: {0}")]
    Playback(String),
}

/// A rejected drag-and-drop operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    /// No tile with this id exists in the current question.
    #[error("unknown tile {0}")]
    UnknownTile(usize),

    /// The tile is not in the collection the operation named.
    #[error("tile {tile} is not in the {zone}")]
    NotInZone { tile: usize, zone: &'static str },

    /// Another tile is already being dragged.
    #[error("tile {0} is already being dragged")]
    GestureInProgress(usize),

    /// No drag gesture is in progress.
    #[error("no tile is being dragged")]
    NoGesture,

    /// The exercise is advancing or finished and does not accept input.
    #[error("exercise is not accepting input")]
    NotAccepting,
}

/// A progress record that breaks the invariants of recorded history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("quiz {quiz_id}: best score {best_score} is above 100")]
    BestScoreOutOfRange { quiz_id: String, best_score: u8 },

    #[error("quiz {quiz_id}: completed is {completed} but best score is {best_score}")]
    CompletedMismatch {
        quiz_id: String,
        completed: bool,
        best_score: u8,
    },

    #[error("quiz {quiz_id}: attempt has a total of zero")]
    ZeroTotal { quiz_id: String },

    #[error("quiz {quiz_id}: attempt percentage {percentage} is above 100")]
    PercentageOutOfRange { quiz_id: String, percentage: u8 },

    #[error("quiz {quiz_id}: attempt percentage {percentage} exceeds best score {best_score}")]
    AttemptAboveBest {
        quiz_id: String,
        percentage: u8,
        best_score: u8,
    },
}
