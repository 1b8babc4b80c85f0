//! Entity Identifiers
//!
//! A customer is addressed either by the identifier the authoritative store
//! assigned it, or by a temporary identifier minted locally while the create
//! that will eventually assign a server id is still queued.
//!
//! Both serialize as plain strings. Temporary ids carry the `temp_` prefix so
//! they can never be confused with a server id after a round trip through
//! local storage.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix that marks a locally generated identifier
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Identifier of a customer record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// Assigned by the authoritative store
    Server(String),
    /// Generated locally, valid until the matching create is confirmed
    Temp(Uuid),
}

impl EntityId {
    /// Mint a fresh temporary identifier
    pub fn new_temp() -> Self {
        Self::Temp(Uuid::new_v4())
    }

    /// Wrap a server-assigned identifier
    pub fn server(id: impl Into<String>) -> Self {
        Self::Server(id.into())
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, Self::Temp(_))
    }

    /// The server id, if this is one
    pub fn as_server(&self) -> Option<&str> {
        match self {
            Self::Server(id) => Some(id),
            Self::Temp(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => f.write_str(id),
            Self::Temp(uuid) => write!(f, "{}{}", TEMP_ID_PREFIX, uuid),
        }
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(TEMP_ID_PREFIX) {
            Some(rest) => Ok(Self::Temp(Uuid::parse_str(rest)?)),
            None => Ok(Self::Server(s.to_string())),
        }
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Postgres identity columns come back as JSON numbers
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawId::Number(n) => Ok(Self::Server(n.to_string())),
        }
    }
}
