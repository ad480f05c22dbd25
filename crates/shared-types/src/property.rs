//! # Property Snapshot
//!
//! The slice of the external property catalog that the deal core consumes.
//! The catalog owns property CRUD and search; this core only reads the
//! snapshot `{id, ownerId, status}` and writes the availability status back
//! through the catalog port.

use crate::ids::{PropertyId, UserId};
use serde::{Deserialize, Serialize};

/// Availability status of a property, derived from deal state.
///
/// - `Rented` iff the property has a linked `Completed` deal
/// - `Pending` while a deal is active but not completed
/// - `Available` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Pending,
    Rented,
}

impl PropertyStatus {
    /// Whether a new deal may be opened against a property in this status.
    pub fn accepts_deals(self) -> bool {
        matches!(self, Self::Available | Self::Pending)
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Rented => "rented",
        };
        f.write_str(s)
    }
}

/// Read-model of a property as served by the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    /// Catalog id of the property.
    pub id: PropertyId,
    /// Recorded owner of the property.
    pub owner_id: UserId,
    /// Current availability status.
    pub status: PropertyStatus,
}
