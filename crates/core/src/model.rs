use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive bounds on how many questions a session may request.
pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    /// The phrase embedded in prompts, localized to the session language.
    pub fn prompt_label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Difficulty::Basic, Language::English) => "basic level",
            (Difficulty::Intermediate, Language::English) => "intermediate level",
            (Difficulty::Advanced, Language::English) => "advanced level",
            (Difficulty::Basic, Language::Turkish) => "temel seviye",
            (Difficulty::Intermediate, Language::Turkish) => "orta seviye",
            (Difficulty::Advanced, Language::Turkish) => "ileri seviye",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Difficulty::Basic),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Turkish,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Turkish => "Turkish",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" => Ok(Language::English),
            "turkish" => Ok(Language::Turkish),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("profession must not be empty")]
    EmptyProfession,
    #[error("question count {0} is outside the allowed range {MIN_QUESTIONS}..={MAX_QUESTIONS}")]
    QuestionCountOutOfRange(usize),
}

/// Immutable configuration for one interview session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub profession: String,
    pub difficulty: Difficulty,
    pub language: Language,
    pub question_count: usize,
}

impl SessionConfig {
    pub fn new(
        profession: impl Into<String>,
        difficulty: Difficulty,
        language: Language,
        question_count: usize,
    ) -> Result<Self, ConfigValidationError> {
        let profession = profession.into();
        if profession.trim().is_empty() {
            return Err(ConfigValidationError::EmptyProfession);
        }
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
            return Err(ConfigValidationError::QuestionCountOutOfRange(
                question_count,
            ));
        }
        Ok(Self {
            profession,
            difficulty,
            language,
            question_count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

impl QuestionAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Structured result of evaluating a finished interview.
///
/// List fields keep insertion order; that order is the presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub detailed_feedback: String,
}

/// A persisted, completed session as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub profession: String,
    pub difficulty: Difficulty,
    pub language: Language,
    pub evaluation: Evaluation,
    /// Ordered by question number, 1-indexed in the store.
    pub questions: Vec<QuestionAnswer>,
}
