use axum::Json;
use axum::extract::{Query, State};
use esas_education::SearchHit;
use esas_scoring::Symptom;
use serde::Deserialize;

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct EducationQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub symptom: Option<Symptom>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Free-text search, or every article for a symptom when only `symptom`
/// is given.
pub async fn search_education(
    State(state): State<AppState>,
    Query(query): Query<EducationQuery>,
) -> Json<Vec<SearchHit>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let text = query.q.as_deref().map(str::trim).unwrap_or_default();

    let hits = match (text.is_empty(), query.symptom) {
        (false, symptom) => {
            let mut hits = state.education.search(text, MAX_LIMIT);
            if let Some(symptom) = symptom {
                hits.retain(|h| h.article.symptoms.contains(&symptom));
            }
            hits.truncate(limit);
            hits
        }
        (true, Some(symptom)) => state
            .education
            .for_symptom(symptom)
            .into_iter()
            .take(limit)
            .map(|article| SearchHit {
                article: article.clone(),
                score: 0.0,
            })
            .collect(),
        (true, None) => Vec::new(),
    };

    Json(hits)
}
