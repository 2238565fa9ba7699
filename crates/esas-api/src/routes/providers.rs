use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use esas_audit::{Actor, AuditAction, AuditEvent};
use esas_core::keys;
use esas_core::models::account::Role;
use esas_core::models::provider::ProviderRecord;
use esas_storage::records;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, require_role};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProvider {
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub facility_name: Option<String>,
}

/// Register a provider for an existing account. Patients are promoted to
/// nurses; admins keep their role.
pub async fn create_provider(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateProvider>,
) -> Result<(StatusCode, Json<ProviderRecord>), ApiError> {
    let caller = user.profile(&state).await?.value;
    require_role(&caller, &[Role::Admin])?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest {
            message: "name must not be empty".to_string(),
            field: Some("name".to_string()),
        });
    }
    if !keys::is_safe_segment(&req.account_id) {
        return Err(ApiError::bad_request("invalid account id"));
    }

    let mut target = state
        .bounded(records::get_account(state.store(), &req.account_id))
        .await?;
    if target.value.provider_id.is_some() {
        return Err(ApiError::Conflict(
            "account already has a provider record".to_string(),
        ));
    }

    let provider = ProviderRecord {
        id: Uuid::new_v4(),
        account_id: req.account_id.clone(),
        name: name.to_string(),
        license_number: req.license_number,
        facility_name: req.facility_name,
        created_at: jiff::Timestamp::now(),
    };
    state
        .bounded(records::create_provider(state.store(), &provider))
        .await?;

    target.value.provider_id = Some(provider.id);
    if target.value.role == Role::Patient {
        target.value.role = Role::Nurse;
    }
    target.value.updated_at = jiff::Timestamp::now();
    state
        .bounded(records::save_account_if_match(
            state.store(),
            &target.value,
            &target.etag,
        ))
        .await?;

    AuditEvent::new(
        AuditAction::ProviderCreated,
        "provider",
        provider.id,
        Actor::Account(caller.account_id),
    )
    .with_details(serde_json::json!({ "account_id": provider.account_id }))
    .emit();

    Ok((StatusCode::CREATED, Json(provider)))
}
