use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Oldest age the intake form accepts.
pub const MAX_AGE: u8 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Identity fields captured on the screening form.
///
/// Guests have no patient record, so these are embedded in every screening
/// and later used to seed the patient created when a guest registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubjectIdentity {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    #[serde(default)]
    pub facility_name: Option<String>,
}

impl SubjectIdentity {
    /// Trim the name and check the fields a screening cannot be stored without.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(CoreError::MissingField("identity.name".to_string()));
        }
        if self.age > MAX_AGE {
            return Err(CoreError::invalid(
                "identity.age",
                format!("{} is above {MAX_AGE}", self.age),
            ));
        }
        self.facility_name = self.facility_name.map(|f| f.trim().to_string());
        Ok(self)
    }
}
