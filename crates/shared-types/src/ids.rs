//! # Identifiers
//!
//! Newtype identifiers for the three entity families that cross crate
//! boundaries. User and property ids are issued by external collaborators
//! (auth layer, property catalog) and carried verbatim; deal ids are
//! generated here as UUIDv4 strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type used across all subsystem crates.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identity of a platform user, as supplied by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Identity of a property in the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

/// Identity of a deal aggregate, generated at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(pub String);

impl DealId {
    /// Generate a fresh deal id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

macro_rules! string_id {
    ($ty:ty) => {
        impl $ty {
            /// Borrow the underlying string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(UserId);
string_id!(PropertyId);
string_id!(DealId);
