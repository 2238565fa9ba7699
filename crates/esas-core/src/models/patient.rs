use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::identity::{Gender, SubjectIdentity};

/// Namespace for patient ids derived from account ids.
const ACCOUNT_PATIENT_NAMESPACE: Uuid = Uuid::from_u128(0x5f0c_2a61_8e3b_4d7a_9c1e_7b42_d0a9_e6f3);

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PatientRecord {
    pub id: Uuid,
    pub account_id: Option<String>,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub facility_name: Option<String>,
    /// Provider who registered the patient, for nurse-created records.
    pub created_by: Option<Uuid>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl PatientRecord {
    /// A patient registered by a nurse, with no account yet.
    pub fn registered_by(provider_id: Uuid, identity: SubjectIdentity) -> Self {
        Self::build(Uuid::new_v4(), None, Some(provider_id), identity)
    }

    /// The patient owned by `account_id`, seeded from screening identity.
    ///
    /// The id is derived from the account id, so every creator racing to
    /// create this patient writes the same key.
    pub fn for_account(account_id: &str, identity: SubjectIdentity) -> Self {
        Self::build(
            patient_id_for_account(account_id),
            Some(account_id.to_string()),
            None,
            identity,
        )
    }

    pub fn identity(&self) -> SubjectIdentity {
        SubjectIdentity {
            name: self.name.clone(),
            age: self.age,
            gender: self.gender,
            facility_name: self.facility_name.clone(),
        }
    }

    fn build(
        id: Uuid,
        account_id: Option<String>,
        created_by: Option<Uuid>,
        identity: SubjectIdentity,
    ) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id,
            account_id,
            name: identity.name,
            age: identity.age,
            gender: identity.gender,
            facility_name: identity.facility_name,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn patient_id_for_account(account_id: &str) -> Uuid {
    Uuid::new_v5(&ACCOUNT_PATIENT_NAMESPACE, account_id.as_bytes())
}
