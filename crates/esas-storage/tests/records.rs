use esas_core::models::account::AccountProfile;
use esas_core::models::identity::{Gender, SubjectIdentity};
use esas_core::models::patient::PatientRecord;
use esas_core::models::screening::{ScreeningRecord, ScreeningSubject};
use esas_scoring::validate;
use esas_storage::error::StorageError;
use esas_storage::memory::MemoryObjectStore;
use esas_storage::records;
use serde_json::json;
use uuid::Uuid;

fn identity(name: &str) -> SubjectIdentity {
    SubjectIdentity {
        name: name.to_string(),
        age: 58,
        gender: Gender::Male,
        facility_name: Some("Puskesmas Sukamaju".to_string()),
    }
}

fn screening(subject: ScreeningSubject) -> ScreeningRecord {
    let raw = json!({"1": 2, "2": 4, "3": 1, "4": 0, "5": 3, "6": 0, "7": 1, "8": 2, "9": 3});
    ScreeningRecord::new(subject, identity("Ahmad"), validate(raw.as_object().unwrap()).unwrap())
}

#[tokio::test]
async fn guest_screenings_are_indexed_by_token() {
    let store = MemoryObjectStore::new();
    let a = screening(ScreeningSubject::Guest {
        guest_token: "tok1".to_string(),
    });
    let b = screening(ScreeningSubject::Guest {
        guest_token: "tok1".to_string(),
    });
    let other = screening(ScreeningSubject::Guest {
        guest_token: "tok2".to_string(),
    });
    for s in [&a, &b, &other] {
        records::create_screening(&store, s).await.unwrap();
    }

    let mut ids = records::guest_screening_ids(&store, "tok1").await.unwrap();
    ids.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(ids, expected);

    records::remove_guest_index_entry(&store, "tok1", a.id)
        .await
        .unwrap();
    assert_eq!(
        records::guest_screening_ids(&store, "tok1").await.unwrap(),
        vec![b.id]
    );
    assert_eq!(records::list_screenings(&store).await.unwrap().len(), 3);
}

#[tokio::test]
async fn replace_requires_current_etag() {
    let store = MemoryObjectStore::new();
    let mut record = screening(ScreeningSubject::Guest {
        guest_token: "tok".to_string(),
    });
    records::create_screening(&store, &record).await.unwrap();

    let read = records::get_screening(&store, record.id).await.unwrap();
    record
        .link_to_account("acct", Uuid::new_v4(), jiff::Timestamp::now())
        .unwrap();
    records::replace_screening(&store, &record, &read.etag)
        .await
        .unwrap();

    let stale = records::replace_screening(&store, &record, &read.etag).await;
    assert!(matches!(stale, Err(StorageError::PreconditionFailed { .. })));

    let stored = records::get_screening(&store, record.id).await.unwrap();
    assert_eq!(stored.value.account_id.as_deref(), Some("acct"));
    assert_eq!(stored.value.guest_token, None);
}

#[tokio::test]
async fn patient_creation_is_exclusive() {
    let store = MemoryObjectStore::new();
    let patient = PatientRecord::for_account("acct", identity("Dewi"));
    records::create_patient(&store, &patient).await.unwrap();
    let dup = records::create_patient(&store, &patient).await;
    assert!(matches!(dup, Err(StorageError::PreconditionFailed { .. })));

    let loaded = records::get_patient(&store, patient.id).await.unwrap();
    assert_eq!(loaded.value.name, "Dewi");
    assert_eq!(records::list_patients(&store).await.unwrap().len(), 1);
}

#[tokio::test]
async fn account_updates_are_conditional() {
    let store = MemoryObjectStore::new();
    let profile = AccountProfile::new_patient("acct", "Dewi");
    records::create_account(&store, &profile).await.unwrap();

    let read = records::get_account(&store, "acct").await.unwrap();
    let mut updated = read.value.clone();
    updated.patient_id = Some(Uuid::new_v4());
    records::save_account_if_match(&store, &updated, &read.etag)
        .await
        .unwrap();
    assert!(
        records::save_account_if_match(&store, &updated, &read.etag)
            .await
            .is_err()
    );
}
