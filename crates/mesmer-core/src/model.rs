//! Quiz content types.
//!
//! These are the immutable inputs to the run-loops: multiple-choice
//! questions, word-building questions, and memory-game pairs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The text (or emoji) shown to the learner.
    pub prompt: String,
    /// Answer choices in display order.
    pub choices: Vec<String>,
    /// The choice that counts as correct. Compared by exact equality.
    pub correct: String,
    /// Page-specific extras (audio file, picture, transliteration).
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl Question {
    /// Build a question without metadata.
    pub fn new(prompt: &str, choices: &[&str], correct: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            correct: correct.to_string(),
            meta: BTreeMap::new(),
        }
    }

    /// Whether `correct` is one of `choices`.
    pub fn is_answerable(&self) -> bool {
        self.choices.iter().any(|c| c == &self.correct)
    }
}

/// A word to assemble from letter tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildQuestion {
    /// The target word.
    pub word: String,
    /// Exactly the tiles that spell `word`, in order.
    pub tiles: Vec<String>,
}

impl BuildQuestion {
    pub fn new(word: &str, tiles: &[&str]) -> Self {
        Self {
            word: word.to_string(),
            tiles: tiles.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Whether the tiles, concatenated in order, spell the word.
    pub fn tiles_spell_word(&self) -> bool {
        self.tiles.concat() == self.word
    }
}

/// A word and its picture, matched in the memory game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub word: String,
    pub pic: String,
}

impl Pair {
    pub fn new(word: &str, pic: &str) -> Self {
        Self {
            word: word.to_string(),
            pic: pic.to_string(),
        }
    }
}

/// Which face of a pair a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Word,
    Pic,
}

/// One card of the memory deck. Every pair yields a word card and a pic card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub kind: CardKind,
    pub value: String,
    /// Index of the owning pair in the game's pair list.
    pub pair: usize,
}

impl Card {
    /// Two cards match when they come from the same pair and show different faces.
    pub fn matches(&self, other: &Card) -> bool {
        self.pair == other.pair && self.kind != other.kind
    }
}

/// The three kinds of exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    Choice,
    Build,
    Memory,
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizKind::Choice => write!(f, "choice"),
            QuizKind::Build => write!(f, "build"),
            QuizKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "choice" | "multiple-choice" | "mc" => Ok(QuizKind::Choice),
            "build" | "dragdrop" | "drag-drop" => Ok(QuizKind::Build),
            "memory" | "match" => Ok(QuizKind::Memory),
            other => Err(format!("unknown quiz kind: {other}")),
        }
    }
}

/// The exercises of one quiz, by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizContent {
    Choice(Vec<Question>),
    Build(Vec<BuildQuestion>),
    Memory(Vec<Pair>),
}

impl QuizContent {
    pub fn kind(&self) -> QuizKind {
        match self {
            QuizContent::Choice(_) => QuizKind::Choice,
            QuizContent::Build(_) => QuizKind::Build,
            QuizContent::Memory(_) => QuizKind::Memory,
        }
    }

    /// Number of questions, words, or pairs.
    pub fn len(&self) -> usize {
        match self {
            QuizContent::Choice(q) => q.len(),
            QuizContent::Build(q) => q.len(),
            QuizContent::Memory(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A quiz page: its identifier, title, and content.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizDefinition {
    /// Stable key for this quiz's progress record.
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: QuizContent,
}
