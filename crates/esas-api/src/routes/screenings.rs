use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use esas_audit::{Actor, AuditAction, AuditEvent};
use esas_core::models::account::{AccountProfile, Role};
use esas_core::models::identity::SubjectIdentity;
use esas_core::models::screening::{
    Ownership, ScreeningRecord, ScreeningSubject, SubjectType, new_guest_token,
};
use esas_linker::patient_for_account;
use esas_recommendations::Recommendation;
use esas_scoring::{Classification, validate};
use esas_storage::records;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GuestScreeningRequest {
    pub identity: SubjectIdentity,
    pub scores: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct ScreeningRequest {
    /// Required for a patient's first screening; otherwise taken from the
    /// patient record when absent.
    #[serde(default)]
    pub identity: Option<SubjectIdentity>,
    pub scores: Map<String, Value>,
    /// The patient being screened. Required for staff.
    #[serde(default)]
    pub patient_id: Option<Uuid>,
}

/// Everything the form needs to show the outcome without another request.
#[derive(Serialize)]
pub struct ScreeningResponse {
    pub screening_id: Uuid,
    pub classification: Classification,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
}

/// A stored screening as returned to clients. The guest token is never
/// echoed back after creation.
#[derive(Serialize)]
pub struct ScreeningView {
    pub ownership: Ownership,
    #[serde(flatten)]
    pub record: ScreeningRecord,
}

impl From<ScreeningRecord> for ScreeningView {
    fn from(mut record: ScreeningRecord) -> Self {
        let ownership = record.ownership();
        record.guest_token = None;
        Self { ownership, record }
    }
}

#[derive(Serialize)]
pub struct ScreeningSummary {
    pub id: Uuid,
    pub subject_type: SubjectType,
    pub ownership: Ownership,
    pub patient_id: Option<Uuid>,
    pub name: String,
    pub classification: Classification,
    pub created_at: jiff::Timestamp,
}

impl From<&ScreeningRecord> for ScreeningSummary {
    fn from(record: &ScreeningRecord) -> Self {
        Self {
            id: record.id,
            subject_type: record.subject_type,
            ownership: record.ownership(),
            patient_id: record.patient_id,
            name: record.identity.name.clone(),
            classification: record.classification,
            created_at: record.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub patient_id: Option<Uuid>,
}

/// Anonymous submission. The response carries the guest token the client
/// keeps until it registers and links.
pub async fn create_guest_screening(
    State(state): State<AppState>,
    Json(req): Json<GuestScreeningRequest>,
) -> Result<(StatusCode, Json<ScreeningResponse>), ApiError> {
    let scores = validate(&req.scores)?;
    let identity = req.identity.normalized()?;

    let guest_token = new_guest_token();
    let record = ScreeningRecord::new(
        ScreeningSubject::Guest {
            guest_token: guest_token.clone(),
        },
        identity,
        scores,
    );
    state
        .bounded(records::create_screening(state.store(), &record))
        .await?;

    AuditEvent::new(AuditAction::ScreeningCreated, "screening", record.id, Actor::Guest)
        .with_details(serde_json::json!({ "subject_type": record.subject_type }))
        .emit();

    let mut response = screening_response(&state, &record)?;
    response.guest_token = Some(guest_token);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Self screening by a patient, or assisted screening by a nurse.
pub async fn create_screening(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ScreeningRequest>,
) -> Result<(StatusCode, Json<ScreeningResponse>), ApiError> {
    let profile = user.profile(&state).await?.value;
    let scores = validate(&req.scores)?;

    let (subject, identity) = match profile.role {
        Role::Patient => self_subject(&state, &profile, req.identity, req.patient_id).await?,
        Role::Nurse | Role::Admin => assisted_subject(&state, &profile, req.patient_id).await?,
    };

    let record = ScreeningRecord::new(subject, identity, scores);
    state
        .bounded(records::create_screening(state.store(), &record))
        .await?;

    AuditEvent::new(
        AuditAction::ScreeningCreated,
        "screening",
        record.id,
        Actor::Account(profile.account_id.clone()),
    )
    .with_details(serde_json::json!({
        "subject_type": record.subject_type,
        "patient_id": record.patient_id,
    }))
    .emit();

    Ok((StatusCode::CREATED, Json(screening_response(&state, &record)?)))
}

async fn self_subject(
    state: &AppState,
    profile: &AccountProfile,
    identity: Option<SubjectIdentity>,
    requested_patient: Option<Uuid>,
) -> Result<(ScreeningSubject, SubjectIdentity), ApiError> {
    if requested_patient.is_some() && requested_patient != profile.patient_id {
        return Err(ApiError::Forbidden(
            "patients may only screen themselves".to_string(),
        ));
    }

    let identity = match (identity, profile.patient_id) {
        (Some(identity), _) => identity.normalized()?,
        (None, Some(patient_id)) => state
            .bounded(records::get_patient(state.store(), patient_id))
            .await?
            .value
            .identity(),
        (None, None) => {
            return Err(ApiError::BadRequest {
                message: "identity is required for the first screening".to_string(),
                field: Some("identity".to_string()),
            });
        }
    };

    let patient_id = match profile.patient_id {
        Some(patient_id) => patient_id,
        None => {
            state
                .bounded(patient_for_account(
                    state.store(),
                    &profile.account_id,
                    identity.clone(),
                ))
                .await?
        }
    };

    Ok((
        ScreeningSubject::SelfRegistered {
            account_id: profile.account_id.clone(),
            patient_id,
        },
        identity,
    ))
}

async fn assisted_subject(
    state: &AppState,
    profile: &AccountProfile,
    patient_id: Option<Uuid>,
) -> Result<(ScreeningSubject, SubjectIdentity), ApiError> {
    let provider_id = profile.provider_id.ok_or_else(|| {
        ApiError::Forbidden("staff account has no provider record".to_string())
    })?;
    let patient_id = patient_id.ok_or_else(|| ApiError::BadRequest {
        message: "patient_id is required for assisted screenings".to_string(),
        field: Some("patient_id".to_string()),
    })?;

    let patient = state
        .bounded(records::get_patient(state.store(), patient_id))
        .await?
        .value;

    Ok((
        ScreeningSubject::NurseAssisted {
            patient_id,
            provider_id,
            account_id: patient.account_id.clone(),
        },
        patient.identity(),
    ))
}

fn screening_response(
    state: &AppState,
    record: &ScreeningRecord,
) -> Result<ScreeningResponse, ApiError> {
    let classification = record.classification;
    let recommendation = state
        .recommendations
        .resolve(classification.primary_symptom, classification.risk_level)?
        .clone();
    Ok(ScreeningResponse {
        screening_id: record.id,
        classification,
        recommendation,
        guest_token: None,
    })
}

/// Staff see every screening, patients only their own. Newest first.
pub async fn list_screenings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ScreeningSummary>>, ApiError> {
    let profile = user.profile(&state).await?.value;
    let screenings = state
        .bounded(records::list_screenings(state.store()))
        .await?;

    let visible = screenings
        .iter()
        .filter(|s| {
            profile.role.is_staff() || s.is_owned_by(&profile.account_id, profile.patient_id)
        })
        .filter(|s| query.patient_id.is_none() || s.patient_id == query.patient_id)
        .map(ScreeningSummary::from)
        .collect();

    Ok(Json(visible))
}

pub async fn get_screening(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScreeningView>, ApiError> {
    let (_, screening) = visible_screening(&state, &user, id).await?;
    Ok(Json(screening.into()))
}

/// Load a screening the caller may read. Screenings outside the caller's
/// reach are reported as missing.
pub(crate) async fn visible_screening(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<(AccountProfile, ScreeningRecord), ApiError> {
    let profile = user.profile(state).await?.value;
    let screening = state
        .bounded(records::get_screening(state.store(), id))
        .await?
        .value;

    if profile.role.is_staff() || screening.is_owned_by(&profile.account_id, profile.patient_id)
    {
        Ok((profile, screening))
    } else {
        Err(ApiError::NotFound(format!("screening {id} not found")))
    }
}
