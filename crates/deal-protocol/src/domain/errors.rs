//! # Deal Protocol Errors
//!
//! The stable error taxonomy surfaced to callers. Nothing is silently
//! swallowed inside the protocol; conditional-update conflicts from
//! concurrent signing are surfaced as `Conflict` for the caller to re-fetch
//! and resubmit.

use crate::domain::entities::{DealStatus, Party};
use deal_crypto::SignatureError;
use shared_types::{DealId, PropertyId, PropertyStatus, UserId};
use thiserror::Error;

/// Errors surfaced by the deal protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DealError {
    /// Missing or malformed required fields.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The property does not exist in the catalog.
    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    /// The deal does not exist.
    #[error("Deal not found: {0}")]
    DealNotFound(DealId),

    /// No public key is registered for the user.
    #[error("Public key not found for user {0}")]
    PublicKeyNotFound(UserId),

    /// The requester is not a permitted party for the action.
    #[error("Not authorized for this deal")]
    Unauthorized,

    /// The property status does not admit new deals.
    #[error("Property {property} is not available for deals (status: {status})")]
    PropertyUnavailable {
        property: PropertyId,
        status: PropertyStatus,
    },

    /// The supplied owner does not match the property's recorded owner.
    #[error("Owner does not match the property owner")]
    OwnerMismatch,

    /// Duplicate active deal, duplicate review, or a concurrent update
    /// that must be re-fetched and resubmitted.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requester's slot is already signed.
    #[error("This party has already signed the deal")]
    AlreadySigned,

    /// Malformed key/signature input or a failed verification.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// A previously recorded signature no longer verifies against the
    /// counterpart's currently registered key (e.g. after key rotation).
    #[error("Previously recorded {0} signature no longer verifies")]
    StaleCounterpartSignature(Party),

    /// The deal is in a terminal state and rejects further mutation.
    #[error("Deal is already {0} and cannot be modified")]
    DealTerminal(DealStatus),

    /// The deal repository failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The property catalog failed.
    #[error("Property catalog error: {0}")]
    Catalog(String),
}
