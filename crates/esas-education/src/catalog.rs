use std::collections::HashSet;
use std::path::Path;

use esas_scoring::Symptom;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::EducationError;

const CURRENT_VERSION: u32 = 1;

const BUILTIN_CATALOG: &str = include_str!("../data/education.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Symptoms this article helps with. Empty for general material.
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    catalog_version: u32,
    articles: Vec<Article>,
}

/// Read-only set of education articles.
#[derive(Debug, Clone)]
pub struct EducationCatalog {
    version: u32,
    articles: Vec<Article>,
}

impl EducationCatalog {
    pub fn builtin() -> Result<Self, EducationError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, EducationError> {
        let json = std::fs::read_to_string(path).map_err(|source| EducationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            version = catalog.version,
            articles = catalog.articles.len(),
            "loaded education catalog"
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, EducationError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        if doc.catalog_version > CURRENT_VERSION {
            return Err(EducationError::UnsupportedVersion {
                found: doc.catalog_version,
                supported: CURRENT_VERSION,
            });
        }

        let mut seen = HashSet::with_capacity(doc.articles.len());
        for article in &doc.articles {
            if !seen.insert(article.id.as_str()) {
                return Err(EducationError::DuplicateId(article.id.clone()));
            }
        }

        Ok(Self {
            version: doc.catalog_version,
            articles: doc.articles,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Articles tagged with `symptom`, in catalog order.
    pub fn for_symptom(&self, symptom: Symptom) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.symptoms.contains(&symptom))
            .collect()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
