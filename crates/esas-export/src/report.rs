use esas_core::models::identity::{Gender, SubjectIdentity};
use esas_core::models::patient::PatientRecord;
use esas_core::models::provider::ProviderRecord;
use esas_core::models::screening::{ScreeningRecord, SubjectType};
use esas_recommendations::Recommendation;
use esas_scoring::{Classification, Symptom};
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

/// An optional report value.
///
/// A value that was never captured is `NotProvided`; a captured blank
/// string stays `Provided("")`. The two are rendered differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum ReportField {
    Provided(String),
    NotProvided,
}

impl ReportField {
    pub fn is_provided(&self) -> bool {
        matches!(self, ReportField::Provided(_))
    }
}

impl From<Option<String>> for ReportField {
    fn from(value: Option<String>) -> Self {
        value.map_or(ReportField::NotProvided, ReportField::Provided)
    }
}

impl From<Option<&String>> for ReportField {
    fn from(value: Option<&String>) -> Self {
        value.cloned().into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PatientSection {
    /// `None` for a guest screening that was never linked.
    pub patient_id: Option<Uuid>,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub facility_name: ReportField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ProviderSection {
    pub name: ReportField,
    pub license_number: ReportField,
    pub facility_name: ReportField,
}

/// One questionnaire line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ReportRow {
    pub question_id: u8,
    pub symptom: Symptom,
    pub label: String,
    pub score: u8,
    pub is_primary: bool,
}

/// Everything needed to display or print one screening.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ReportView {
    pub screening_id: Uuid,
    pub subject_type: SubjectType,
    pub created_at: jiff::Timestamp,
    pub patient: PatientSection,
    pub provider: ProviderSection,
    /// Rows in question order, 1 through 9.
    pub rows: Vec<ReportRow>,
    pub classification: Classification,
    pub primary_symptom_label: String,
    pub risk_label: String,
    pub recommendation: Option<Recommendation>,
}

impl ReportView {
    pub fn with_recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendation = Some(recommendation);
        self
    }
}

/// Merge a patient, one of their screenings, and the assisting provider.
///
/// Patient fields come from the patient record; the screening's embedded
/// identity is used only by [`assemble_unlinked`].
pub fn assemble(
    patient: &PatientRecord,
    screening: &ScreeningRecord,
    provider: Option<&ProviderRecord>,
) -> ReportView {
    let section = PatientSection {
        patient_id: Some(patient.id),
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender,
        facility_name: patient.facility_name.as_ref().into(),
    };
    build(section, screening, provider)
}

/// Report for a screening that has no patient record, such as a guest
/// screening not yet linked to an account.
pub fn assemble_unlinked(
    screening: &ScreeningRecord,
    provider: Option<&ProviderRecord>,
) -> ReportView {
    let SubjectIdentity {
        name,
        age,
        gender,
        facility_name,
    } = screening.identity.clone();
    let section = PatientSection {
        patient_id: screening.patient_id,
        name,
        age,
        gender,
        facility_name: facility_name.into(),
    };
    build(section, screening, provider)
}

fn build(
    patient: PatientSection,
    screening: &ScreeningRecord,
    provider: Option<&ProviderRecord>,
) -> ReportView {
    let classification = screening.classification;
    let rows = screening
        .scores
        .iter()
        .map(|(symptom, score)| ReportRow {
            question_id: symptom.question_id(),
            symptom,
            label: symptom.label().to_string(),
            score,
            is_primary: symptom == classification.primary_symptom,
        })
        .collect();

    let provider = ProviderSection {
        name: provider.map(|p| p.name.clone()).into(),
        license_number: provider.and_then(|p| p.license_number.clone()).into(),
        facility_name: provider.and_then(|p| p.facility_name.clone()).into(),
    };

    ReportView {
        screening_id: screening.id,
        subject_type: screening.subject_type,
        created_at: screening.created_at,
        patient,
        provider,
        rows,
        classification,
        primary_symptom_label: classification.primary_symptom.label().to_string(),
        risk_label: classification.risk_level.to_string(),
        recommendation: None,
    }
}
