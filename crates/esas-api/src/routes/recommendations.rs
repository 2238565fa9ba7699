use axum::Json;
use axum::extract::{Path, State};
use esas_recommendations::Recommendation;
use esas_scoring::{RiskLevel, Symptom};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_recommendation(
    State(state): State<AppState>,
    Path((symptom, risk_level)): Path<(Symptom, RiskLevel)>,
) -> Result<Json<Recommendation>, ApiError> {
    let recommendation = state.recommendations.resolve(symptom, risk_level)?;
    Ok(Json(recommendation.clone()))
}
