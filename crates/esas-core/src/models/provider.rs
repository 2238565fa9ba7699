use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A care provider (nurse) who can run assisted screenings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProviderRecord {
    pub id: Uuid,
    pub account_id: String,
    pub name: String,
    pub license_number: Option<String>,
    pub facility_name: Option<String>,
    pub created_at: jiff::Timestamp,
}
