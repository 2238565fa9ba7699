use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    Nurse,
    Patient,
}

impl Role {
    /// Whether this role may read every patient's screenings.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Nurse)
    }
}

/// Profile row for an authenticated account.
///
/// `account_id` is the subject issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountProfile {
    pub account_id: String,
    pub role: Role,
    pub display_name: String,
    pub patient_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl AccountProfile {
    pub fn new_patient(account_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            account_id: account_id.into(),
            role: Role::Patient,
            display_name: display_name.into(),
            patient_id: None,
            provider_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
