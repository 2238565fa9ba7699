use esas_core::keys;
use esas_core::models::account::AccountProfile;
use esas_core::models::identity::SubjectIdentity;
use esas_core::models::patient::{PatientRecord, patient_id_for_account};
use esas_core::models::screening::ScreeningRecord;
use esas_storage::error::{OptionalExt, StorageError};
use esas_storage::objects::ObjectStore;
use esas_storage::records::{self, Versioned};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::LinkError;

/// A request to hand a guest's screenings over to a registered account.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct GuestLinkRequest {
    pub guest_token: String,
    pub account_id: String,
    /// Screening the client already knows about (e.g. the one it just
    /// submitted). Must still be held by `guest_token`.
    #[serde(default)]
    pub screening_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LinkOutcome {
    pub patient_id: Uuid,
    pub screening_ids: Vec<Uuid>,
}

/// Link every screening still held by a guest token to an account.
///
/// State is re-read on every call, never cached: a second call for a token
/// that was already linked finds nothing and fails with
/// [`LinkError::GuestIdentifierNotFound`] without writing anything.
///
/// Each screening moves `Guest -> Linked` through a conditional write
/// guarded by the ETag it was read at. Screenings are written in ascending
/// id order, so two requests racing for the same token contend on the same
/// first record. Nothing else is written until that first screening is
/// claimed, so the loser leaves no patient or profile change behind.
pub async fn link(
    store: &impl ObjectStore,
    request: &GuestLinkRequest,
) -> Result<LinkOutcome, LinkError> {
    if !keys::is_safe_segment(&request.guest_token) {
        return Err(LinkError::GuestIdentifierNotFound);
    }
    if !keys::is_safe_segment(&request.account_id) {
        return Err(LinkError::InvalidAccount);
    }

    let held = held_screenings(store, request).await?;
    if held.is_empty() {
        tracing::info!(account_id = %request.account_id, "no guest screenings to link");
        return Err(LinkError::GuestIdentifierNotFound);
    }
    if let Some(wanted) = request.screening_id
        && !held.iter().any(|s| s.value.id == wanted)
    {
        tracing::info!(screening_id = %wanted, "requested screening is not held by this guest");
        return Err(LinkError::GuestIdentifierNotFound);
    }

    let identity = held
        .iter()
        .max_by_key(|s| s.value.created_at)
        .map(|s| s.value.identity.clone())
        .ok_or(LinkError::GuestIdentifierNotFound)?;

    let mut account = records::get_account(store, &request.account_id)
        .await
        .optional()?;
    let patient_id = account
        .as_ref()
        .and_then(|a| a.value.patient_id)
        .unwrap_or_else(|| patient_id_for_account(&request.account_id));

    let linked_at = jiff::Timestamp::now();
    let mut screening_ids = Vec::with_capacity(held.len());
    for screening in held {
        let id = claim_screening(store, request, screening, patient_id, linked_at).await?;
        if screening_ids.is_empty() {
            // The first screening is claimed; the patient is only written
            // once this request owns the token.
            ensure_patient(
                store,
                &request.account_id,
                account.take(),
                patient_id,
                identity.clone(),
            )
            .await?;
        }
        screening_ids.push(id);
    }

    for id in &screening_ids {
        // The index is advisory; a stale entry is filtered out on read.
        if let Err(e) = records::remove_guest_index_entry(store, &request.guest_token, *id).await {
            tracing::warn!(screening_id = %id, error = %e, "failed to remove guest index entry");
        }
    }

    tracing::info!(
        account_id = %request.account_id,
        patient_id = %patient_id,
        linked = screening_ids.len(),
        "guest screenings linked"
    );

    Ok(LinkOutcome {
        patient_id,
        screening_ids,
    })
}

/// Screenings still held by the guest token, sorted by id, each paired with
/// the ETag it was read at.
async fn held_screenings(
    store: &impl ObjectStore,
    request: &GuestLinkRequest,
) -> Result<Vec<Versioned<ScreeningRecord>>, LinkError> {
    let mut ids = records::guest_screening_ids(store, &request.guest_token).await?;
    if let Some(id) = request.screening_id {
        ids.push(id);
    }
    ids.sort();
    ids.dedup();

    let mut held = Vec::with_capacity(ids.len());
    for id in ids {
        match records::get_screening(store, id).await {
            Ok(screening) if screening.value.is_held_by_guest(&request.guest_token) => {
                held.push(screening)
            }
            Ok(_) | Err(StorageError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(held)
}

/// Move one screening from `Guest` to `Linked`, guarded by the ETag it was
/// read at.
async fn claim_screening(
    store: &impl ObjectStore,
    request: &GuestLinkRequest,
    screening: Versioned<ScreeningRecord>,
    patient_id: Uuid,
    linked_at: jiff::Timestamp,
) -> Result<Uuid, LinkError> {
    let Versioned { mut value, etag } = screening;
    let key = keys::screening(value.id);
    value
        .link_to_account(&request.account_id, patient_id, linked_at)
        .map_err(|_| LinkError::ConcurrentLinkConflict { key: key.clone() })?;

    match records::replace_screening(store, &value, &etag).await {
        Ok(_) => Ok(value.id),
        Err(StorageError::PreconditionFailed { .. } | StorageError::NotFound { .. }) => {
            tracing::warn!(
                screening_id = %value.id,
                "screening changed since it was read, abandoning link"
            );
            Err(LinkError::ConcurrentLinkConflict { key })
        }
        Err(e) => Err(e.into()),
    }
}

/// The account's patient id, creating the patient if the account has none.
///
/// The created patient has an id derived from the account id and is seeded
/// from `identity`. Concurrent callers converge on the same record.
pub async fn patient_for_account(
    store: &impl ObjectStore,
    account_id: &str,
    identity: SubjectIdentity,
) -> Result<Uuid, LinkError> {
    let account = records::get_account(store, account_id).await.optional()?;
    let patient_id = account
        .as_ref()
        .and_then(|a| a.value.patient_id)
        .unwrap_or_else(|| patient_id_for_account(account_id));

    ensure_patient(store, account_id, account, patient_id, identity).await?;
    Ok(patient_id)
}

/// Create the account's patient if absent and record it on the profile.
/// A profile that already names `patient_id` is left alone.
async fn ensure_patient(
    store: &impl ObjectStore,
    account_id: &str,
    account: Option<Versioned<AccountProfile>>,
    patient_id: Uuid,
    identity: SubjectIdentity,
) -> Result<(), LinkError> {
    if account
        .as_ref()
        .is_some_and(|a| a.value.patient_id == Some(patient_id))
    {
        return Ok(());
    }

    let patient = PatientRecord::for_account(account_id, identity);
    match records::create_patient(store, &patient).await {
        Ok(_) => tracing::info!(patient_id = %patient.id, "created patient for linked account"),
        Err(StorageError::PreconditionFailed { .. }) => {
            tracing::debug!(patient_id = %patient.id, "account patient already exists");
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(Versioned { mut value, etag }) = account {
        value.patient_id = Some(patient.id);
        value.updated_at = jiff::Timestamp::now();
        match records::save_account_if_match(store, &value, &etag).await {
            Ok(_) => {}
            Err(StorageError::PreconditionFailed { .. }) => {
                let current = records::get_account(store, account_id).await?;
                if current.value.patient_id != Some(patient.id) {
                    return Err(LinkError::ConcurrentLinkConflict {
                        key: keys::account(account_id),
                    });
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
