use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use esas_audit::{Actor, AuditAction, AuditEvent};
use esas_core::models::identity::SubjectIdentity;
use esas_core::models::patient::PatientRecord;
use esas_storage::records;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, require_staff};
use crate::state::AppState;

/// Register a patient who has no account, for assisted screening.
pub async fn create_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(identity): Json<SubjectIdentity>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    let caller = user.profile(&state).await?.value;
    require_staff(&caller)?;
    let provider_id = caller.provider_id.ok_or_else(|| {
        ApiError::Forbidden("staff account has no provider record".to_string())
    })?;

    let patient = PatientRecord::registered_by(provider_id, identity.normalized()?);
    state
        .bounded(records::create_patient(state.store(), &patient))
        .await?;

    AuditEvent::new(
        AuditAction::PatientCreated,
        "patient",
        patient.id,
        Actor::Account(caller.account_id),
    )
    .emit();

    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PatientRecord>>, ApiError> {
    require_staff(&user.profile(&state).await?.value)?;
    let patients = state.bounded(records::list_patients(state.store())).await?;
    Ok(Json(patients))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientRecord>, ApiError> {
    let caller = user.profile(&state).await?.value;
    if !caller.role.is_staff() && caller.patient_id != Some(id) {
        return Err(ApiError::NotFound(format!("patient {id} not found")));
    }
    let patient = state
        .bounded(records::get_patient(state.store(), id))
        .await?
        .value;
    Ok(Json(patient))
}
