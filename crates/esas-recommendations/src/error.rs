use std::path::PathBuf;

use esas_scoring::{RiskLevel, Symptom};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("recommendation not found for {symptom} at {risk_level} risk")]
    NotFound {
        symptom: Symptom,
        risk_level: RiskLevel,
    },

    #[error("recommendation not found for {} pair(s): {}", missing.len(), format_pairs(missing))]
    Incomplete { missing: Vec<(Symptom, RiskLevel)> },

    #[error("duplicate recommendation for {symptom} at {risk_level} risk")]
    DuplicateEntry {
        symptom: Symptom,
        risk_level: RiskLevel,
    },

    #[error("table_version {found} is newer than this build supports ({supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("failed to parse recommendation table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn format_pairs(pairs: &[(Symptom, RiskLevel)]) -> String {
    pairs
        .iter()
        .map(|(symptom, level)| format!("{}/{}", symptom.slug(), level.slug()))
        .collect::<Vec<_>>()
        .join(", ")
}
