use std::collections::HashMap;
use std::path::Path;

use esas_scoring::{RiskLevel, Symptom};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::RecommendationError;

/// Current table format version. Bump when the entry shape changes.
const CURRENT_VERSION: u32 = 1;

const BUILTIN_TABLE: &str = include_str!("../data/recommendations.json");

/// Care guidance for one (symptom, risk level) pair.
///
/// All strings are authored content and are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub diagnosis: String,
    pub therapy: String,
    pub interventions: Vec<String>,
    pub references: Vec<String>,
}

#[derive(Deserialize)]
struct TableDocument {
    table_version: u32,
    entries: Vec<TableEntry>,
}

#[derive(Deserialize)]
struct TableEntry {
    symptom: Symptom,
    risk_level: RiskLevel,
    #[serde(flatten)]
    recommendation: Recommendation,
}

/// Read-only lookup from (symptom, risk level) to a recommendation.
#[derive(Debug, Clone)]
pub struct RecommendationTable {
    version: u32,
    entries: HashMap<(Symptom, RiskLevel), Recommendation>,
}

impl RecommendationTable {
    /// The table shipped with this crate.
    pub fn builtin() -> Result<Self, RecommendationError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Load an operator-maintained table from disk.
    pub fn from_path(path: &Path) -> Result<Self, RecommendationError> {
        let json = std::fs::read_to_string(path).map_err(|source| RecommendationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            version = table.version,
            "loaded recommendation table"
        );
        Ok(table)
    }

    /// Parse a table and require an entry for every pair.
    pub fn from_json(json: &str) -> Result<Self, RecommendationError> {
        let table = Self::parse(json)?;
        table.self_check()?;
        Ok(table)
    }

    /// Parse a table without the completeness check.
    ///
    /// Rejects unknown versions and duplicate pairs. Callers serving
    /// requests must run [`self_check`](Self::self_check) before use.
    pub fn parse(json: &str) -> Result<Self, RecommendationError> {
        let doc: TableDocument = serde_json::from_str(json)?;
        if doc.table_version > CURRENT_VERSION {
            return Err(RecommendationError::UnsupportedVersion {
                found: doc.table_version,
                supported: CURRENT_VERSION,
            });
        }

        let mut entries = HashMap::with_capacity(doc.entries.len());
        for entry in doc.entries {
            let key = (entry.symptom, entry.risk_level);
            if entries.insert(key, entry.recommendation).is_some() {
                return Err(RecommendationError::DuplicateEntry {
                    symptom: key.0,
                    risk_level: key.1,
                });
            }
        }

        Ok(Self {
            version: doc.table_version,
            entries,
        })
    }

    /// Enumerate every (symptom, risk level) pair and report the missing ones.
    pub fn self_check(&self) -> Result<(), RecommendationError> {
        let missing: Vec<_> = Symptom::ALL
            .iter()
            .flat_map(|s| RiskLevel::ALL.iter().map(move |r| (*s, *r)))
            .filter(|pair| !self.entries.contains_key(pair))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RecommendationError::Incomplete { missing })
        }
    }

    pub fn resolve(
        &self,
        symptom: Symptom,
        risk_level: RiskLevel,
    ) -> Result<&Recommendation, RecommendationError> {
        self.entries
            .get(&(symptom, risk_level))
            .ok_or(RecommendationError::NotFound {
                symptom,
                risk_level,
            })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
