use axum::Json;
use esas_scoring::{Question, questionnaire};

/// The fixed questionnaire, in question order.
pub async fn list_symptoms() -> Json<Vec<Question>> {
    Json(questionnaire().to_vec())
}
