use esas_scoring::{Classification, ScoreSet, classify};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::identity::SubjectIdentity;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SubjectType {
    SelfRegistered,
    NurseAssisted,
    Guest,
}

/// Who a screening is being created for.
#[derive(Debug, Clone)]
pub enum ScreeningSubject {
    Guest {
        guest_token: String,
    },
    SelfRegistered {
        account_id: String,
        patient_id: Uuid,
    },
    NurseAssisted {
        patient_id: Uuid,
        provider_id: Uuid,
        account_id: Option<String>,
    },
}

/// Ownership state of a stored screening.
///
/// `Guest -> Linked` is the only transition and it is one-way. Screenings
/// created for a patient start (and stay) `Owned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Ownership {
    Guest,
    Linked,
    Owned,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningRecord {
    pub id: Uuid,
    pub subject_type: SubjectType,
    pub identity: SubjectIdentity,
    #[ts(type = "Record<string, number>")]
    pub scores: ScoreSet,
    pub classification: Classification,
    /// Present only while the screening belongs to a guest.
    pub guest_token: Option<String>,
    pub account_id: Option<String>,
    pub patient_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub linked_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
}

impl ScreeningRecord {
    /// Build a new screening, classifying the scores.
    pub fn new(subject: ScreeningSubject, identity: SubjectIdentity, scores: ScoreSet) -> Self {
        let (subject_type, guest_token, account_id, patient_id, provider_id) = match subject {
            ScreeningSubject::Guest { guest_token } => {
                (SubjectType::Guest, Some(guest_token), None, None, None)
            }
            ScreeningSubject::SelfRegistered {
                account_id,
                patient_id,
            } => (
                SubjectType::SelfRegistered,
                None,
                Some(account_id),
                Some(patient_id),
                None,
            ),
            ScreeningSubject::NurseAssisted {
                patient_id,
                provider_id,
                account_id,
            } => (
                SubjectType::NurseAssisted,
                None,
                account_id,
                Some(patient_id),
                Some(provider_id),
            ),
        };

        Self {
            id: Uuid::new_v4(),
            subject_type,
            identity,
            classification: classify(&scores),
            scores,
            guest_token,
            account_id,
            patient_id,
            provider_id,
            linked_at: None,
            created_at: jiff::Timestamp::now(),
        }
    }

    pub fn ownership(&self) -> Ownership {
        if self.guest_token.is_some() {
            Ownership::Guest
        } else if self.linked_at.is_some() {
            Ownership::Linked
        } else {
            Ownership::Owned
        }
    }

    /// Whether this screening is still owned by `guest_token`.
    pub fn is_held_by_guest(&self, guest_token: &str) -> bool {
        self.subject_type == SubjectType::Guest && self.guest_token.as_deref() == Some(guest_token)
    }

    /// Move a guest screening to its registered owner.
    ///
    /// Rewrites the subject type, clears the guest token and records the
    /// owning account and patient. Fails on any screening not in the
    /// `Guest` state.
    pub fn link_to_account(
        &mut self,
        account_id: &str,
        patient_id: Uuid,
        at: jiff::Timestamp,
    ) -> Result<(), CoreError> {
        if self.ownership() != Ownership::Guest {
            return Err(CoreError::NotGuest(self.id));
        }
        self.subject_type = SubjectType::SelfRegistered;
        self.guest_token = None;
        self.account_id = Some(account_id.to_string());
        self.patient_id = Some(patient_id);
        self.linked_at = Some(at);
        Ok(())
    }

    /// Whether `account_id` (or its patient) owns this screening.
    pub fn is_owned_by(&self, account_id: &str, patient_id: Option<Uuid>) -> bool {
        self.account_id.as_deref() == Some(account_id)
            || (patient_id.is_some() && self.patient_id == patient_id)
    }
}

/// Generate an opaque token identifying an anonymous screening subject.
pub fn new_guest_token() -> String {
    Uuid::new_v4().simple().to_string()
}
