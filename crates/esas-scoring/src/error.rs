use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

/// Reasons a raw score submission is rejected.
///
/// These are client input errors and carry enough detail to point at the
/// failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum ValidationError {
    #[error("incomplete score set: missing question(s) {missing:?}")]
    IncompleteScoreSet { missing: Vec<u8> },

    #[error("invalid question id '{key}': expected 1-9")]
    InvalidQuestionId { key: String },

    #[error("question {question_id}: score {value} is not an integer in [0, 10]")]
    ScoreOutOfRange { question_id: u8, value: String },
}

impl ValidationError {
    /// Path of the offending field within the submission.
    pub fn field(&self) -> String {
        match self {
            ValidationError::IncompleteScoreSet { .. } => "scores".to_string(),
            ValidationError::InvalidQuestionId { key } => format!("scores.{key}"),
            ValidationError::ScoreOutOfRange { question_id, .. } => {
                format!("scores.{question_id}")
            }
        }
    }
}
