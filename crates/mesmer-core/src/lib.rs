//! mesmer-core — Quiz run-loops, scoring, and progress tracking.
//!
//! This crate holds everything a quiz page needs apart from rendering: the
//! content model, the three run-loops, the scoring and statistics functions,
//! and progress persistence over an abstract key-value backend.

pub mod clock;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod messages;
pub mod model;
pub mod page;
pub mod parser;
pub mod progress;
pub mod sound;
pub mod statistics;
pub mod storage;
pub mod tracker;
