//! People that shirts are cataloged under.

use serde::{Deserialize, Serialize};

/// A person in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identifier (`per_`-prefixed UUID).
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Input for creating a person.
#[derive(Clone, Debug, Deserialize)]
pub struct NewPerson {
    /// Display name.
    pub name: String,
}

/// Input for renaming a person.
#[derive(Clone, Debug, Deserialize)]
pub struct PersonUpdate {
    /// New display name.
    pub name: String,
}
