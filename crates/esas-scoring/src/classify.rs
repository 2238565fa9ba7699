use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::scoring::ScoreSet;
use crate::symptom::Symptom;

/// Highest score at or above which a screening is high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 7;

/// Highest score at or above which a screening is at least medium risk.
pub const MEDIUM_RISK_THRESHOLD: u8 = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// Bucket a highest score. A score of 0 (no symptoms) shares the Low
    /// bucket with mild scores.
    pub fn from_highest_score(score: u8) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        })
    }
}

/// Outcome of classifying a score set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Classification {
    pub highest_score: u8,
    pub primary_symptom: Symptom,
    pub risk_level: RiskLevel,
    /// Question id of the primary symptom, used for display ordering.
    pub priority_rank: u8,
}

/// Classify a validated score set.
///
/// When several symptoms share the highest score, the one with the lowest
/// question id is primary.
pub fn classify(scores: &ScoreSet) -> Classification {
    let (primary_symptom, highest_score) = scores
        .iter()
        .fold((Symptom::Pain, scores.get(Symptom::Pain)), |best, (symptom, score)| {
            if score > best.1 {
                (symptom, score)
            } else {
                best
            }
        });

    Classification {
        highest_score,
        primary_symptom,
        risk_level: RiskLevel::from_highest_score(highest_score),
        priority_rank: primary_symptom.question_id(),
    }
}
