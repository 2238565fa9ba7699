use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub storage: &'static str,
    pub recommendation_table_version: u32,
    pub education_catalog_version: u32,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        storage: state.store.name(),
        recommendation_table_version: state.recommendations.version(),
        education_catalog_version: state.education.version(),
    })
}
