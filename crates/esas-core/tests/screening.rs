use esas_core::error::CoreError;
use esas_core::keys;
use esas_core::models::identity::{Gender, SubjectIdentity};
use esas_core::models::patient::{PatientRecord, patient_id_for_account};
use esas_core::models::screening::{
    Ownership, ScreeningRecord, ScreeningSubject, SubjectType, new_guest_token,
};
use esas_scoring::{RiskLevel, Symptom, validate};
use serde_json::{Value, json};
use uuid::Uuid;

fn identity() -> SubjectIdentity {
    SubjectIdentity {
        name: "Siti Rahma".to_string(),
        age: 64,
        gender: Gender::Female,
        facility_name: None,
    }
}

fn guest_screening(token: &str) -> ScreeningRecord {
    let raw = json!({"1": 7, "2": 5, "3": 3, "4": 6, "5": 4, "6": 8, "7": 5, "8": 6, "9": 4});
    let scores = validate(raw.as_object().unwrap()).unwrap();
    ScreeningRecord::new(
        ScreeningSubject::Guest {
            guest_token: token.to_string(),
        },
        identity(),
        scores,
    )
}

#[test]
fn new_screening_is_classified() {
    let record = guest_screening("abc");
    assert_eq!(record.subject_type, SubjectType::Guest);
    assert_eq!(record.classification.primary_symptom, Symptom::Breathlessness);
    assert_eq!(record.classification.risk_level, RiskLevel::High);
    assert_eq!(record.ownership(), Ownership::Guest);
    assert!(record.is_held_by_guest("abc"));
    assert!(!record.is_held_by_guest("abd"));
}

#[test]
fn linking_is_one_way() {
    let mut record = guest_screening("abc");
    let patient_id = Uuid::new_v4();
    record
        .link_to_account("acct-1", patient_id, jiff::Timestamp::now())
        .unwrap();

    assert_eq!(record.ownership(), Ownership::Linked);
    assert_eq!(record.subject_type, SubjectType::SelfRegistered);
    assert_eq!(record.guest_token, None);
    assert_eq!(record.patient_id, Some(patient_id));
    assert!(record.is_owned_by("acct-1", None));
    assert!(!record.is_held_by_guest("abc"));

    let again = record.link_to_account("acct-2", Uuid::new_v4(), jiff::Timestamp::now());
    assert!(matches!(again, Err(CoreError::NotGuest(id)) if id == record.id));
    assert_eq!(record.account_id.as_deref(), Some("acct-1"));
}

#[test]
fn owned_screenings_cannot_be_linked() {
    let raw = json!({"1": 1, "2": 1, "3": 1, "4": 1, "5": 1, "6": 1, "7": 1, "8": 1, "9": 1});
    let mut record = ScreeningRecord::new(
        ScreeningSubject::NurseAssisted {
            patient_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            account_id: None,
        },
        identity(),
        validate(raw.as_object().unwrap()).unwrap(),
    );
    assert_eq!(record.ownership(), Ownership::Owned);
    assert!(
        record
            .link_to_account("acct", Uuid::new_v4(), jiff::Timestamp::now())
            .is_err()
    );
}

#[test]
fn stored_record_round_trips_through_json() {
    let record = guest_screening(&new_guest_token());
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["scores"]["6"], json!(8));
    assert_eq!(value["subject_type"], json!("guest"));
    let back: ScreeningRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back.scores, record.scores);
    assert_eq!(back.classification, record.classification);
}

#[test]
fn tampered_scores_fail_to_load() {
    let mut value = serde_json::to_value(guest_screening("abc")).unwrap();
    value["scores"]["2"] = Value::from(11);
    assert!(serde_json::from_value::<ScreeningRecord>(value).is_err());
}

#[test]
fn identity_is_normalized() {
    let trimmed = SubjectIdentity {
        name: "  Budi  ".to_string(),
        facility_name: Some(" RS Harapan ".to_string()),
        ..identity()
    }
    .normalized()
    .unwrap();
    assert_eq!(trimmed.name, "Budi");
    assert_eq!(trimmed.facility_name.as_deref(), Some("RS Harapan"));

    let blank = SubjectIdentity {
        name: "   ".to_string(),
        ..identity()
    };
    assert!(matches!(blank.normalized(), Err(CoreError::MissingField(_))));

    let old = SubjectIdentity {
        age: 200,
        ..identity()
    };
    assert!(matches!(old.normalized(), Err(CoreError::InvalidField { .. })));
}

#[test]
fn account_patient_id_is_stable() {
    let a = PatientRecord::for_account("acct-1", identity());
    let b = PatientRecord::for_account("acct-1", identity());
    assert_eq!(a.id, b.id);
    assert_eq!(a.id, patient_id_for_account("acct-1"));
    assert_ne!(a.id, patient_id_for_account("acct-2"));
    assert_eq!(a.identity(), identity());
}

#[test]
fn key_layout() {
    let id = Uuid::new_v4();
    assert_eq!(keys::id_from_record_key(&keys::screening(id)), Some(id));
    assert_eq!(
        keys::screening_id_from_guest_entry(&keys::guest_index_entry("tok", id)),
        Some(id)
    );
    assert!(keys::guest_index_entry("tok", id).starts_with(&keys::guest_index_prefix("tok")));
    assert!(keys::is_safe_segment(&new_guest_token()));
    assert!(keys::is_safe_segment("us-east-1:4f1c@example.org"));
    for bad in ["", "..", "a/b", "tok en", "x?y"] {
        assert!(!keys::is_safe_segment(bad), "{bad:?}");
    }
}
