//! Object key conventions.
//!
//! Pure string functions. These define the canonical layout of records in
//! the screening bucket, whichever object store backs it.

use uuid::Uuid;

pub const SCREENINGS_PREFIX: &str = "screenings/";
pub const PATIENTS_PREFIX: &str = "patients/";

pub fn screening(id: Uuid) -> String {
    format!("screenings/{id}.json")
}

pub fn patient(id: Uuid) -> String {
    format!("patients/{id}.json")
}

pub fn provider(id: Uuid) -> String {
    format!("providers/{id}.json")
}

pub fn account(account_id: &str) -> String {
    format!("accounts/{account_id}.json")
}

/// Marker objects listing the screenings submitted under a guest token.
/// The marker body is empty; the screening id is the last path segment.
pub fn guest_index_prefix(guest_token: &str) -> String {
    format!("guest-index/{guest_token}/")
}

pub fn guest_index_entry(guest_token: &str, screening_id: Uuid) -> String {
    format!("guest-index/{guest_token}/{screening_id}")
}

pub fn report_docx(screening_id: Uuid) -> String {
    format!("reports/{screening_id}/report.docx")
}

/// Whether `segment` can be embedded in a key without escaping its prefix.
///
/// Account ids come from the identity provider and guest tokens from
/// clients, so both are checked before being used in a key.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 128
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | ':'))
        && segment != "."
        && segment != ".."
}

/// Parse the screening id out of a guest index key.
pub fn screening_id_from_guest_entry(key: &str) -> Option<Uuid> {
    key.rsplit('/').next().and_then(|id| id.parse().ok())
}

/// Parse a record id out of a `<prefix><uuid>.json` key.
pub fn id_from_record_key(key: &str) -> Option<Uuid> {
    key.rsplit('/')
        .next()
        .and_then(|name| name.strip_suffix(".json"))
        .and_then(|id| id.parse().ok())
}
