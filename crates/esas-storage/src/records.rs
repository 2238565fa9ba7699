//! Typed access to the records laid out by [`esas_core::keys`].

use esas_core::keys;
use esas_core::models::account::AccountProfile;
use esas_core::models::patient::PatientRecord;
use esas_core::models::provider::ProviderRecord;
use esas_core::models::screening::ScreeningRecord;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::StorageError;
use crate::objects::ObjectStore;
use crate::state;

/// A record together with the ETag it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: String,
}

async fn get_versioned<T: DeserializeOwned>(
    store: &impl ObjectStore,
    key: &str,
) -> Result<Versioned<T>, StorageError> {
    let (value, etag) = state::load_json(store, key).await?;
    Ok(Versioned { value, etag })
}

async fn list_records<T: DeserializeOwned>(
    store: &impl ObjectStore,
    prefix: &str,
) -> Result<Vec<T>, StorageError> {
    let keys = store.list_objects(prefix).await?;

    let mut records = Vec::with_capacity(keys.len());
    for key in keys.iter().filter(|k| keys::id_from_record_key(k).is_some()) {
        match state::load_json::<T>(store, key).await {
            Ok((record, _)) => records.push(record),
            // Deleted between list and get.
            Err(StorageError::NotFound { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

pub async fn get_screening(
    store: &impl ObjectStore,
    id: Uuid,
) -> Result<Versioned<ScreeningRecord>, StorageError> {
    get_versioned(store, &keys::screening(id)).await
}

/// Persist a new screening.
///
/// Guest screenings get their guest index entry written first, so a
/// screening is never stored without being reachable from its token. An
/// entry whose screening write failed is skipped by readers.
pub async fn create_screening(
    store: &impl ObjectStore,
    record: &ScreeningRecord,
) -> Result<String, StorageError> {
    if let Some(token) = &record.guest_token {
        store
            .put_object(&keys::guest_index_entry(token, record.id), Vec::new(), None)
            .await?;
    }
    let etag = state::create_json(store, &keys::screening(record.id), record).await?;
    tracing::debug!(screening_id = %record.id, "screening stored");
    Ok(etag)
}

/// Overwrite a screening only if it is unchanged since it was read.
pub async fn replace_screening(
    store: &impl ObjectStore,
    record: &ScreeningRecord,
    expected_etag: &str,
) -> Result<String, StorageError> {
    state::save_json_if_match(store, &keys::screening(record.id), record, expected_etag).await
}

/// All screenings, newest first.
pub async fn list_screenings(store: &impl ObjectStore) -> Result<Vec<ScreeningRecord>, StorageError> {
    let mut screenings: Vec<ScreeningRecord> =
        list_records(store, keys::SCREENINGS_PREFIX).await?;
    screenings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(screenings)
}

/// Screening ids indexed under a guest token.
///
/// The index is a lookup aid only; entries may point at screenings that
/// have since been linked, so callers must check each record's state.
pub async fn guest_screening_ids(
    store: &impl ObjectStore,
    guest_token: &str,
) -> Result<Vec<Uuid>, StorageError> {
    let keys = store
        .list_objects(&keys::guest_index_prefix(guest_token))
        .await?;
    Ok(keys
        .iter()
        .filter_map(|k| keys::screening_id_from_guest_entry(k))
        .collect())
}

pub async fn remove_guest_index_entry(
    store: &impl ObjectStore,
    guest_token: &str,
    screening_id: Uuid,
) -> Result<(), StorageError> {
    store
        .delete_object(&keys::guest_index_entry(guest_token, screening_id))
        .await
}

pub async fn get_patient(
    store: &impl ObjectStore,
    id: Uuid,
) -> Result<Versioned<PatientRecord>, StorageError> {
    get_versioned(store, &keys::patient(id)).await
}

/// Create a patient, failing with `PreconditionFailed` if the id is taken.
pub async fn create_patient(
    store: &impl ObjectStore,
    patient: &PatientRecord,
) -> Result<String, StorageError> {
    state::create_json(store, &keys::patient(patient.id), patient).await
}

pub async fn list_patients(store: &impl ObjectStore) -> Result<Vec<PatientRecord>, StorageError> {
    let mut patients: Vec<PatientRecord> = list_records(store, keys::PATIENTS_PREFIX).await?;
    patients.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(patients)
}

pub async fn get_provider(
    store: &impl ObjectStore,
    id: Uuid,
) -> Result<ProviderRecord, StorageError> {
    let (provider, _) = state::load_json(store, &keys::provider(id)).await?;
    Ok(provider)
}

pub async fn create_provider(
    store: &impl ObjectStore,
    provider: &ProviderRecord,
) -> Result<String, StorageError> {
    state::create_json(store, &keys::provider(provider.id), provider).await
}

pub async fn get_account(
    store: &impl ObjectStore,
    account_id: &str,
) -> Result<Versioned<AccountProfile>, StorageError> {
    get_versioned(store, &keys::account(account_id)).await
}

pub async fn create_account(
    store: &impl ObjectStore,
    profile: &AccountProfile,
) -> Result<String, StorageError> {
    state::create_json(store, &keys::account(&profile.account_id), profile).await
}

pub async fn save_account_if_match(
    store: &impl ObjectStore,
    profile: &AccountProfile,
    expected_etag: &str,
) -> Result<String, StorageError> {
    state::save_json_if_match(
        store,
        &keys::account(&profile.account_id),
        profile,
        expected_etag,
    )
    .await
}
