use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use esas_audit::{Actor, AuditAction, AuditEvent};
use esas_core::keys;
use esas_core::models::screening::ScreeningRecord;
use esas_export::docx::generate_docx;
use esas_export::render::render_report;
use esas_export::styles::DocumentStyles;
use esas_export::{ReportView, assemble, assemble_unlinked};
use esas_storage::error::OptionalExt;
use esas_storage::objects::ObjectStore;
use esas_storage::records;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::screenings::visible_screening;
use crate::state::AppState;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

#[derive(Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Docx,
    Markdown,
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportView>, ApiError> {
    let (profile, screening) = visible_screening(&state, &user, id).await?;
    let view = build_report(&state, &screening).await?;

    AuditEvent::new(
        AuditAction::ReportViewed,
        "screening",
        id,
        Actor::Account(profile.account_id),
    )
    .emit();

    Ok(Json(view))
}

/// Export a report as Markdown or DOCX. DOCX exports are also kept in
/// storage next to the screening.
pub async fn export_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let (profile, screening) = visible_screening(&state, &user, id).await?;
    let view = build_report(&state, &screening).await?;
    let rendered = render_report(&view)?;

    let (bytes, content_type) = match req.format {
        ExportFormat::Markdown => (rendered.into_bytes(), MARKDOWN_CONTENT_TYPE),
        ExportFormat::Docx => {
            let bytes = generate_docx(&rendered, &DocumentStyles::default())?;
            state
                .bounded(state.store().put_object(
                    &keys::report_docx(id),
                    bytes.clone(),
                    Some(DOCX_CONTENT_TYPE),
                ))
                .await?;
            (bytes, DOCX_CONTENT_TYPE)
        }
    };

    AuditEvent::new(
        AuditAction::ReportExported,
        "screening",
        id,
        Actor::Account(profile.account_id),
    )
    .with_details(serde_json::json!({ "format": format!("{:?}", req.format).to_lowercase() }))
    .emit();

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

async fn build_report(state: &AppState, screening: &ScreeningRecord) -> Result<ReportView, ApiError> {
    let provider = match screening.provider_id {
        Some(provider_id) => state
            .bounded(records::get_provider(state.store(), provider_id))
            .await
            .optional()?,
        None => None,
    };

    let patient = match screening.patient_id {
        Some(patient_id) => state
            .bounded(records::get_patient(state.store(), patient_id))
            .await
            .optional()?,
        None => None,
    };

    let view = match &patient {
        Some(patient) => assemble(&patient.value, screening, provider.as_ref()),
        None => assemble_unlinked(screening, provider.as_ref()),
    };

    let classification = screening.classification;
    let recommendation = state
        .recommendations
        .resolve(classification.primary_symptom, classification.risk_level)?
        .clone();
    Ok(view.with_recommendation(recommendation))
}
