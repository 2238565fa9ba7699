use std::fmt;

use serde::Serialize;
use tracing::info;

/// Actions on patient data that are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ScreeningCreated,
    GuestLinked,
    ReportViewed,
    ReportExported,
    PatientCreated,
    ProviderCreated,
    AccountCreated,
    RoleChanged,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::ScreeningCreated => "screening_created",
            AuditAction::GuestLinked => "guest_linked",
            AuditAction::ReportViewed => "report_viewed",
            AuditAction::ReportExported => "report_exported",
            AuditAction::PatientCreated => "patient_created",
            AuditAction::ProviderCreated => "provider_created",
            AuditAction::AccountCreated => "account_created",
            AuditAction::RoleChanged => "role_changed",
        }
    }
}

/// Who performed an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    Account(String),
    /// An anonymous screening subject. The token itself is not logged.
    Guest,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Account(id) => write!(f, "account:{id}"),
            Actor::Guest => f.write_str("guest"),
        }
    }
}

/// A structured audit event.
///
/// Emitted through `tracing` so it lands in the same JSON log stream as
/// the request logs, under the `audit` target.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub actor: Actor,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl ToString,
        actor: Actor,
    ) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.to_string(),
            actor,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn emit(&self) {
        let details = self
            .details
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default();
        info!(
            target: "audit",
            {
                audit.action = self.action.as_str(),
                audit.resource_type = %self.resource_type,
                audit.resource_id = %self.resource_id,
                audit.actor = %self.actor,
                audit.details = %details,
            },
            "audit event"
        );
    }
}
