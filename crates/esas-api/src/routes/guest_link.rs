use axum::extract::State;
use axum::{Extension, Json};
use esas_audit::{Actor, AuditAction, AuditEvent};
use esas_linker::{GuestLinkRequest, LinkOutcome, link};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GuestLinkBody {
    pub guest_token: String,
    #[serde(default)]
    pub screening_id: Option<Uuid>,
}

/// Move the caller's earlier guest screenings to their account.
///
/// The target account is always the caller; it is never taken from the
/// body. A 409 may be retried once.
pub async fn link_guest(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<GuestLinkBody>,
) -> Result<Json<LinkOutcome>, ApiError> {
    // Linking requires a registered account so the patient lands on it.
    user.profile(&state).await?;

    let request = GuestLinkRequest {
        guest_token: body.guest_token,
        account_id: user.account_id.clone(),
        screening_id: body.screening_id,
    };
    let outcome = state.bounded(link(state.store(), &request)).await?;

    AuditEvent::new(
        AuditAction::GuestLinked,
        "patient",
        outcome.patient_id,
        Actor::Account(user.account_id),
    )
    .with_details(serde_json::json!({ "screening_ids": outcome.screening_ids }))
    .emit();

    Ok(Json(outcome))
}
