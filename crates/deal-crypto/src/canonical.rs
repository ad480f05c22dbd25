//! # Canonical Deal Core
//!
//! Deterministic serialization of the subset of deal fields both parties
//! sign over. Two independent callers constructing the same logical deal
//! core MUST produce byte-identical output; this is the linchpin of
//! cross-party signature agreement.
//!
//! The canonical schema is exactly `{propertyId, ownerId, renterId}` in that
//! order, values as plain strings, absent renter rendered as `null` (never
//! omitted). Lease terms, dates, and amounts are deliberately outside the
//! signed core; the same schema is applied on the sign and verify paths.

use crate::errors::SignatureError;
use serde::Serialize;
use shared_types::{PropertyId, UserId};

/// The fields both parties agree on by signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealCore {
    /// Property the deal is about.
    pub property_id: PropertyId,
    /// Recorded owner of the property.
    pub owner_id: UserId,
    /// Prospective renter; absent when the owner opens a deal without a
    /// named counterpart.
    pub renter_id: Option<UserId>,
}

impl DealCore {
    /// Build a core from its three identifiers.
    pub fn new(property_id: PropertyId, owner_id: UserId, renter_id: Option<UserId>) -> Self {
        Self {
            property_id,
            owner_id,
            renter_id,
        }
    }
}

/// Serialize the deal core to its canonical byte form.
///
/// Compact JSON with keys in declaration order, matching what signing
/// clients produce. Field order and the explicit `null` for an absent
/// renter are part of the wire contract.
pub fn canonicalize(core: &DealCore) -> Result<Vec<u8>, SignatureError> {
    serde_json::to_vec(core).map_err(|e| SignatureError::Canonicalization(e.to_string()))
}
