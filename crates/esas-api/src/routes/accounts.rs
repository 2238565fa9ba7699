use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use esas_audit::{Actor, AuditAction, AuditEvent};
use esas_core::keys;
use esas_core::models::account::{AccountProfile, Role};
use esas_storage::error::StorageError;
use esas_storage::records;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, require_role};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

/// Register the caller. New accounts are patients unless listed in
/// `ESAS_ADMIN_ACCOUNTS`.
pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountProfile>), ApiError> {
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::BadRequest {
            message: "display_name must not be empty".to_string(),
            field: Some("display_name".to_string()),
        });
    }

    let mut profile = AccountProfile::new_patient(&user.account_id, display_name);
    if state.admin_accounts.contains(&user.account_id) {
        profile.role = Role::Admin;
    }

    match state
        .bounded(records::create_account(state.store(), &profile))
        .await
    {
        Ok(_) => {}
        Err(StorageError::PreconditionFailed { .. }) => {
            return Err(ApiError::Conflict("account already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    AuditEvent::new(
        AuditAction::AccountCreated,
        "account",
        &profile.account_id,
        Actor::Account(user.account_id),
    )
    .with_details(serde_json::json!({ "role": profile.role }))
    .emit();

    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AccountProfile>, ApiError> {
    Ok(Json(user.profile(&state).await?.value))
}

pub async fn set_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(account_id): Path<String>,
    Json(change): Json<RoleChange>,
) -> Result<Json<AccountProfile>, ApiError> {
    let caller = user.profile(&state).await?.value;
    require_role(&caller, &[Role::Admin])?;
    if !keys::is_safe_segment(&account_id) {
        return Err(ApiError::bad_request("invalid account id"));
    }

    let mut target = state
        .bounded(records::get_account(state.store(), &account_id))
        .await?;
    let previous = target.value.role;
    target.value.role = change.role;
    target.value.updated_at = jiff::Timestamp::now();
    state
        .bounded(records::save_account_if_match(
            state.store(),
            &target.value,
            &target.etag,
        ))
        .await?;

    AuditEvent::new(
        AuditAction::RoleChanged,
        "account",
        &account_id,
        Actor::Account(caller.account_id),
    )
    .with_details(serde_json::json!({ "from": previous, "to": change.role }))
    .emit();

    Ok(Json(target.value))
}
