use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::category::CategorySet;

/// JSON source of the question bank that ships with the crate.
const BUNDLED_QUESTIONS: &str = include_str!("../../data/questions.json");

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question category cannot be empty")]
    EmptyCategory,

    #[error("a question needs at least two options, got {len}")]
    TooFewOptions { len: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("correct option {index} is out of range for {len} options")]
    CorrectOptionOutOfRange { index: usize, len: usize },

    #[error("question bank is empty")]
    EmptyBank,

    #[error("question {index} is invalid: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: Box<QuestionError>,
    },

    #[error("question {index} uses unknown category `{category}`")]
    UnknownCategory { index: usize, category: String },

    #[error("question bank could not be parsed: {0}")]
    Parse(String),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears in a JSON question bank.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub category: String,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_option: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub guidance: String,
    #[serde(default)]
    pub learning_points: Vec<String>,
}

impl QuestionDraft {
    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or category is blank, fewer than two
    /// options are given, an option is blank, or the correct index is out of range.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(QuestionError::EmptyCategory);
        }
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                len: self.options.len(),
            });
        }
        if let Some(index) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if self.correct_option >= self.options.len() {
            return Err(QuestionError::CorrectOptionOutOfRange {
                index: self.correct_option,
                len: self.options.len(),
            });
        }

        Ok(Question {
            category,
            prompt,
            options: self.options,
            correct_option: self.correct_option,
            explanation: self.explanation.trim().to_owned(),
            guidance: self.guidance.trim().to_owned(),
            learning_points: self.learning_points,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    category: String,
    prompt: String,
    options: Vec<String>,
    correct_option: usize,
    explanation: String,
    guidance: String,
    learning_points: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }

    /// Explanation shown after an incorrect answer. May be empty.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn guidance(&self) -> &str {
        &self.guidance
    }

    #[must_use]
    pub fn learning_points(&self) -> &[String] {
        &self.learning_points
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// Non-empty, read-only set of questions an assessment draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already validated questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyBank` if no questions are given.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        if questions.is_empty() {
            return Err(QuestionError::EmptyBank);
        }
        Ok(Self { questions })
    }

    /// Validate a list of drafts into a bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidEntry` naming the first invalid draft, or
    /// `QuestionError::EmptyBank`.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, QuestionError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft.validate().map_err(|err| QuestionError::InvalidEntry {
                    index,
                    source: Box::new(err),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Parse a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::Parse` for malformed JSON and the validation
    /// errors of [`QuestionBank::from_drafts`].
    pub fn from_json(json: &str) -> Result<Self, QuestionError> {
        let drafts: Vec<QuestionDraft> =
            serde_json::from_str(json).map_err(|err| QuestionError::Parse(err.to_string()))?;
        Self::from_drafts(drafts)
    }

    /// The PMO leadership bank bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the bundled data fails validation.
    pub fn bundled() -> Result<Self, QuestionError> {
        Self::from_json(BUNDLED_QUESTIONS)
    }

    /// Check that every question is tagged with an active category.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::UnknownCategory` for the first unmatched question.
    pub fn validate_categories(&self, categories: &CategorySet) -> Result<(), QuestionError> {
        for (index, question) in self.questions.iter().enumerate() {
            if !categories.contains(question.category()) {
                return Err(QuestionError::UnknownCategory {
                    index,
                    category: question.category().to_owned(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
