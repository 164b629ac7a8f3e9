//! User repository records

use serde::{Deserialize, Serialize};

/// A user row as returned by the repository API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
}

/// One allergy row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyRecord {
    pub user_id: String,
    pub allergy: String,
}

/// A generated recipe and whether the user marked it as a preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub recipe: String,
    pub marked_as_preference: bool,
}

/// Preference row as posted to the repository
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord<'a> {
    pub user_id: &'a str,
    pub recipe: &'a str,
    pub marked_as_preference: bool,
}
