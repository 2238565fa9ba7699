use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use esas_core::keys;
use esas_core::models::account::{AccountProfile, Role};
use esas_storage::error::OptionalExt;
use esas_storage::records::{self, Versioned};

use crate::error::ApiError;
use crate::state::AppState;

/// Reads the authenticated subject forwarded by the gateway.
///
/// Tokens are verified by the identity provider in front of this service;
/// the bearer value that reaches us is the account's subject id. On
/// success, inserts [`AuthUser`] into request extensions.
pub async fn require_auth(mut req: Request, next: Next) -> Response {
    let account_id = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| keys::is_safe_segment(s))
        .map(str::to_string);

    match account_id {
        Some(account_id) => {
            req.extensions_mut().insert(AuthUser { account_id });
            next.run(req).await
        }
        None => ApiError::Unauthorized("missing or malformed bearer token".to_string())
            .into_response(),
    }
}

/// Authenticated subject.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub account_id: String,
}

impl AuthUser {
    /// Load this subject's profile. Unregistered subjects are forbidden.
    pub async fn profile(&self, state: &AppState) -> Result<Versioned<AccountProfile>, ApiError> {
        state
            .bounded(records::get_account(state.store(), &self.account_id))
            .await
            .optional()?
            .ok_or_else(|| ApiError::Forbidden("account is not registered".to_string()))
    }
}

pub fn require_role(profile: &AccountProfile, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&profile.role) {
        Ok(())
    } else {
        tracing::info!(
            account_id = %profile.account_id,
            role = ?profile.role,
            "role not permitted"
        );
        Err(ApiError::Forbidden("insufficient role".to_string()))
    }
}

pub fn require_staff(profile: &AccountProfile) -> Result<(), ApiError> {
    require_role(profile, &[Role::Admin, Role::Nurse])
}
