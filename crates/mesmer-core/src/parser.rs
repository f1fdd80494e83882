//! TOML quiz file parser.
//!
//! Loads quiz definitions from TOML files and directories, and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{BuildQuestion, Pair, Question, QuizContent, QuizDefinition, QuizKind};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    words: Vec<TomlWord>,
    #[serde(default)]
    pairs: Vec<TomlPair>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_kind")]
    kind: String,
}

fn default_kind() -> String {
    "choice".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    prompt: String,
    choices: Vec<String>,
    correct: String,
    #[serde(default)]
    meta: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TomlWord {
    word: String,
    tiles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlPair {
    word: String,
    pic: String,
}

/// A parsed quiz file.
#[derive(Debug, Clone)]
pub struct QuizFile {
    pub definition: QuizDefinition,
    pub source: PathBuf,
    /// Non-empty sections that do not belong to the declared kind.
    pub ignored_sections: Vec<&'static str>,
}

/// Parse a single TOML file.
pub fn parse_quiz(path: &Path) -> Result<QuizFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizFile> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let kind: QuizKind = parsed
        .quiz
        .kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}: {}", source_path.display(), e))?;

    let mut ignored_sections = Vec::new();
    if kind != QuizKind::Choice && !parsed.questions.is_empty() {
        ignored_sections.push("questions");
    }
    if kind != QuizKind::Build && !parsed.words.is_empty() {
        ignored_sections.push("words");
    }
    if kind != QuizKind::Memory && !parsed.pairs.is_empty() {
        ignored_sections.push("pairs");
    }

    let content = match kind {
        QuizKind::Choice => QuizContent::Choice(
            parsed
                .questions
                .into_iter()
                .map(|q| Question {
                    prompt: q.prompt,
                    choices: q.choices,
                    correct: q.correct,
                    meta: q.meta,
                })
                .collect(),
        ),
        QuizKind::Build => QuizContent::Build(
            parsed
                .words
                .into_iter()
                .map(|w| BuildQuestion {
                    word: w.word,
                    tiles: w.tiles,
                })
                .collect(),
        ),
        QuizKind::Memory => QuizContent::Memory(
            parsed
                .pairs
                .into_iter()
                .map(|p| Pair {
                    word: p.word,
                    pic: p.pic,
                })
                .collect(),
        ),
    };

    Ok(QuizFile {
        definition: QuizDefinition {
            id: parsed.quiz.id,
            title: parsed.quiz.title,
            description: parsed.quiz.description,
            content,
        },
        source: source_path.to_path_buf(),
        ignored_sections,
    })
}

/// Recursively load all `.toml` quiz files under a directory, ordered by path.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizFile>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    collect_toml_files(dir, &mut paths)?;
    paths.sort();

    let mut quizzes = Vec::new();
    for path in paths {
        match parse_quiz(&path) {
            Ok(quiz) => quizzes.push(quiz),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(quizzes)
}

fn collect_toml_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_toml_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            out.push(path);
        }
    }
    Ok(())
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The quiz ID.
    pub quiz_id: String,
    /// 0-based index of the offending item, if the warning is about one.
    pub item: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn quiz(quiz_id: &str, message: impl Into<String>) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            item: None,
            message: message.into(),
        }
    }

    fn item(quiz_id: &str, item: usize, message: impl Into<String>) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            item: Some(item),
            message: message.into(),
        }
    }
}

/// Validate one quiz file for common issues.
pub fn validate_quiz(file: &QuizFile) -> Vec<ValidationWarning> {
    let quiz = &file.definition;
    let id = quiz.id.as_str();
    let mut warnings = Vec::new();

    if quiz.id.trim().is_empty() {
        warnings.push(ValidationWarning::quiz(id, "quiz id is empty"));
    }

    for section in &file.ignored_sections {
        warnings.push(ValidationWarning::quiz(
            id,
            format!(
                "[[{section}]] is ignored by a {} quiz",
                quiz.content.kind()
            ),
        ));
    }

    if quiz.content.is_empty() {
        warnings.push(ValidationWarning::quiz(
            id,
            format!("{} quiz has no items", quiz.content.kind()),
        ));
    }

    match &quiz.content {
        QuizContent::Choice(questions) => {
            for (i, q) in questions.iter().enumerate() {
                if q.prompt.trim().is_empty() {
                    warnings.push(ValidationWarning::item(id, i, "prompt is empty"));
                }
                if !q.is_answerable() {
                    warnings.push(ValidationWarning::item(
                        id,
                        i,
                        format!("correct answer '{}' is not among the choices", q.correct),
                    ));
                }
                let mut seen = HashSet::new();
                for choice in &q.choices {
                    if !seen.insert(choice) {
                        warnings.push(ValidationWarning::item(
                            id,
                            i,
                            format!("duplicate choice '{choice}'"),
                        ));
                    }
                }
            }
        }
        QuizContent::Build(words) => {
            for (i, w) in words.iter().enumerate() {
                if w.tiles.is_empty() {
                    warnings.push(ValidationWarning::item(id, i, "no tiles"));
                } else if !w.tiles_spell_word() {
                    warnings.push(ValidationWarning::item(
                        id,
                        i,
                        format!("tiles {:?} do not spell '{}'", w.tiles, w.word),
                    ));
                }
            }
        }
        QuizContent::Memory(pairs) => {
            let mut words = HashSet::new();
            let mut pics = HashSet::new();
            for (i, p) in pairs.iter().enumerate() {
                if !words.insert(&p.word) {
                    warnings.push(ValidationWarning::item(
                        id,
                        i,
                        format!("duplicate pair word '{}'", p.word),
                    ));
                }
                if !pics.insert(&p.pic) {
                    warnings.push(ValidationWarning::item(
                        id,
                        i,
                        format!("duplicate pair picture '{}'", p.pic),
                    ));
                }
            }
        }
    }

    warnings
}

/// Validate a set of quiz files: each file, plus IDs shared between files.
pub fn validate_quiz_set(files: &[QuizFile]) -> Vec<ValidationWarning> {
    let mut warnings: Vec<ValidationWarning> = files.iter().flat_map(validate_quiz).collect();

    let mut seen_ids = HashSet::new();
    for file in files {
        let id = &file.definition.id;
        if !seen_ids.insert(id) {
            warnings.push(ValidationWarning::quiz(
                id,
                format!("duplicate quiz ID (again in {})", file.source.display()),
            ));
        }
    }

    warnings
}
