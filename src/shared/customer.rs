//! Customer Data Structure
//!
//! Represents a tracked customer with a pinned location, and the partial
//! payload used to create or modify one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::error::SyncError;
use crate::shared::identity::EntityId;
use crate::shared::profile::{one_or_many, AuthorProfile};

/// Status assigned by the record form when none is chosen
pub const DEFAULT_STATUS: &str = "lead";

/// A customer record as held by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    /// Server id, or a temp id while the create is queued
    pub id: EntityId,
    /// Customer or business name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Optional email address
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    /// Street address
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    /// Pinned latitude
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Pinned longitude
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Pipeline status (`lead`, `active`, ...)
    #[serde(default = "default_status", deserialize_with = "null_as_default_status")]
    pub status: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Province or governorate
    #[serde(default)]
    pub province: Option<String>,
    /// Area or district
    #[serde(default)]
    pub area: Option<String>,
    /// Business category
    #[serde(default, rename = "type")]
    pub customer_type: Option<String>,
    /// Person to ask for
    #[serde(default)]
    pub contact_name: Option<String>,
    /// Profile id of the creating user
    #[serde(default)]
    pub created_by: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Resolved author, attached on the client and never sent upstream
    #[serde(
        default,
        alias = "user_profiles",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub author_profile: Option<AuthorProfile>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

// Nullable text columns come back as `null` when never set
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_status))
}

impl Customer {
    /// Build a customer from a payload under the given identity
    pub fn from_payload(id: EntityId, payload: &CustomerPayload, created_at: DateTime<Utc>) -> Self {
        let mut customer = Self {
            id,
            name: String::new(),
            email: None,
            phone: String::new(),
            address: String::new(),
            latitude: None,
            longitude: None,
            status: default_status(),
            notes: None,
            province: None,
            area: None,
            customer_type: None,
            contact_name: None,
            created_by: None,
            created_at,
            author_profile: None,
        };
        customer.apply(payload);
        customer
    }

    /// Merge every field present in `payload` into this record
    pub fn apply(&mut self, payload: &CustomerPayload) {
        if let Some(name) = &payload.name {
            self.name = name.clone();
        }
        if let Some(email) = &payload.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &payload.phone {
            self.phone = phone.clone();
        }
        if let Some(address) = &payload.address {
            self.address = address.clone();
        }
        if let Some(latitude) = payload.latitude {
            self.latitude = Some(latitude);
        }
        if let Some(longitude) = payload.longitude {
            self.longitude = Some(longitude);
        }
        if let Some(status) = &payload.status {
            self.status = status.clone();
        }
        if let Some(notes) = &payload.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(province) = &payload.province {
            self.province = Some(province.clone());
        }
        if let Some(area) = &payload.area {
            self.area = Some(area.clone());
        }
        if let Some(customer_type) = &payload.customer_type {
            self.customer_type = Some(customer_type.clone());
        }
        if let Some(contact_name) = &payload.contact_name {
            self.contact_name = Some(contact_name.clone());
        }
        if let Some(created_by) = &payload.created_by {
            self.created_by = Some(created_by.clone());
        }
    }

    /// Pinned location, if both coordinates are known
    pub fn location(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Author display name, if enriched
    pub fn author_name(&self) -> Option<&str> {
        self.author_profile.as_ref().map(|p| p.name.as_str())
    }
}

/// Partial customer payload sent on create and update
///
/// Absent fields are not serialized, so an update only touches what it
/// carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl CustomerPayload {
    /// Payload carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check a payload before it is used to create a customer
    ///
    /// A name is required. Coordinates are optional, but a location must
    /// carry both of them and both must be in range.
    pub fn validate_new(&self) -> Result<(), SyncError> {
        if self.name.as_deref().map_or(true, |v| v.trim().is_empty()) {
            return Err(SyncError::validation("name", "Customer name is required"));
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                    return Err(SyncError::validation("location", "Coordinates are out of range"));
                }
            }
            (None, None) => {}
            _ => {
                return Err(SyncError::validation(
                    "location",
                    "Both latitude and longitude are required",
                ))
            }
        }

        Ok(())
    }
}
