//! Author Profiles and Actors
//!
//! `AuthorProfile` is the display projection of the user who created a
//! customer record. `Actor` is the signed-in user operating the client.

use serde::{Deserialize, Deserializer, Serialize};

/// Name shown when an author cannot be resolved
pub const PLACEHOLDER_AUTHOR_NAME: &str = "User";

/// Author attached to a customer for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    /// Profile id, equal to the customer's `created_by`
    pub id: String,
    /// Display name
    pub name: String,
}

impl AuthorProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Deterministic stand-in for an author that could not be resolved
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(id, PLACEHOLDER_AUTHOR_NAME)
    }
}

/// Accept a profile serialized as an object, a one-element array or null.
///
/// The profile join has been observed in both shapes; the engine only ever
/// stores a single optional profile.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Option<AuthorProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        One(AuthorProfile),
        Many(Vec<AuthorProfile>),
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        Some(Shape::One(profile)) => Some(profile),
        Some(Shape::Many(profiles)) => profiles.into_iter().next(),
        None => None,
    })
}

/// Signed-in user operating the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Profile id of the user
    pub user_id: String,
    /// Admins may modify any record
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin,
        }
    }
}
