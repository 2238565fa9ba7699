//! esas-scoring
//!
//! ESAS questionnaire definition, score validation and risk classification.
//! Pure data and pure functions, no storage dependency.

pub mod classify;
pub mod error;
pub mod scoring;
pub mod symptom;

pub use classify::{Classification, RiskLevel, classify};
pub use error::ValidationError;
pub use scoring::{QUESTION_COUNT, ScoreSet, validate};
pub use symptom::{Question, Symptom, questionnaire};
