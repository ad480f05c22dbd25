//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits for everything the deal protocol depends on: deal persistence,
//! the external property catalog, the signer key directory, and the
//! notification capability. The core holds no live transport handles; it
//! only calls these traits.

use crate::domain::entities::{Deal, DealStatus, Party, Payment, Review, SignatureSlot};
use shared_types::{DealId, PropertyId, PropertySnapshot, PropertyStatus, Timestamp, UserId};
use thiserror::Error;

// =============================================================================
// DEAL REPOSITORY
// =============================================================================

/// Error from deal persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The deal does not exist.
    #[error("Deal not found")]
    NotFound,

    /// A conditional update found its precondition violated (slot already
    /// signed, deal no longer pending, duplicate review). The caller must
    /// re-read and decide.
    #[error("Concurrent update conflict: {0}")]
    ConcurrentUpdate(String),

    /// A lock guarding the store was poisoned.
    #[error("Repository lock poisoned")]
    LockPoisoned,

    /// Backend-specific failure.
    #[error("Repository backend error: {0}")]
    Backend(String),
}

/// Outcome of an insert guarded by the active-deal constraint.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The deal was persisted.
    Created(Deal),
    /// An active (Pending/Completed) deal already exists for the property;
    /// nothing was inserted.
    ActiveExists(Deal),
}

/// Persistence abstraction for deal aggregates.
///
/// `record_signature` is the one non-obvious concurrency control in the
/// core: it MUST be applied as a single atomic conditional update against
/// the store, conditioned on the target slot being unsigned and the deal
/// still `Pending`, so that a losing concurrent writer observes
/// `ConcurrentUpdate` instead of silently overwriting. Implementations
/// also recompute the deal status (both slots signed → `Completed`) inside
/// the same update.
#[async_trait::async_trait]
pub trait DealRepository: Send + Sync {
    /// Insert a deal unless an active deal already exists for its property.
    async fn insert_if_no_active(&self, deal: Deal) -> Result<InsertOutcome, RepositoryError>;

    /// Fetch a deal by id.
    async fn find(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError>;

    /// The active (Pending/Completed) deal for a property, if any.
    async fn find_active_by_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Option<Deal>, RepositoryError>;

    /// A deal matching the exact party triple, regardless of status.
    async fn find_by_parties(
        &self,
        property_id: &PropertyId,
        owner_id: &UserId,
        renter_id: &UserId,
    ) -> Result<Option<Deal>, RepositoryError>;

    /// All deals where the user is the owner or the renter, newest first.
    async fn find_for_user(&self, user: &UserId) -> Result<Vec<Deal>, RepositoryError>;

    /// Conditionally record a signature on a party's slot (see trait docs).
    /// Returns the updated deal with its recomputed status.
    async fn record_signature(
        &self,
        id: &DealId,
        party: Party,
        slot: SignatureSlot,
    ) -> Result<Deal, RepositoryError>;

    /// Overwrite the deal status (manual override path).
    async fn update_status(
        &self,
        id: &DealId,
        status: DealStatus,
        now: Timestamp,
    ) -> Result<Deal, RepositoryError>;

    /// Append a payment.
    async fn append_payment(
        &self,
        id: &DealId,
        payment: Payment,
        now: Timestamp,
    ) -> Result<Deal, RepositoryError>;

    /// Append a review; at most one per user per deal is enforced here as
    /// well as in the service.
    async fn append_review(
        &self,
        id: &DealId,
        review: Review,
        now: Timestamp,
    ) -> Result<Deal, RepositoryError>;
}

// =============================================================================
// PROPERTY CATALOG
// =============================================================================

/// Error from the external property catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A lock guarding the catalog was poisoned.
    #[error("Catalog lock poisoned")]
    LockPoisoned,

    /// Backend-specific failure.
    #[error("Catalog backend error: {0}")]
    Backend(String),
}

/// Gateway to the property catalog collaborator. The catalog owns property
/// CRUD; this core reads snapshots and writes availability status back.
#[async_trait::async_trait]
pub trait PropertyCatalog: Send + Sync {
    /// Current snapshot of a property, if it exists.
    async fn snapshot(&self, id: &PropertyId) -> Result<Option<PropertySnapshot>, CatalogError>;

    /// Set the availability status of a property.
    ///
    /// The write MUST be monotonic with respect to deal completion: a
    /// `pending` write against a property already recorded as `rented` is
    /// dropped, not applied. Projection writes from concurrent signings of
    /// the same deal carry no ordering of their own, so without this rule a
    /// delayed `pending` projection could overwrite the `rented` projection
    /// of the completing signature. No protocol path legitimately moves a
    /// property from `rented` back to `pending`: a completed deal is
    /// terminal and new deals are rejected while the property is rented.
    async fn set_status(&self, id: &PropertyId, status: PropertyStatus)
        -> Result<(), CatalogError>;
}

// =============================================================================
// KEY DIRECTORY
// =============================================================================

/// Error from the signer key directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyDirectoryError {
    /// No key is registered for the user.
    #[error("No public key registered for user {0}")]
    NotFound(UserId),

    /// The directory could not be reached.
    #[error("Key directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of registered signer public keys.
#[async_trait::async_trait]
pub trait KeyDirectory: Send + Sync {
    /// The currently registered SPKI PEM public key for a user.
    async fn public_key_pem(&self, user: &UserId) -> Result<String, KeyDirectoryError>;
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Deal lifecycle events pushed to the messaging collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealEvent {
    DealCreated { deal_id: DealId },
    DealSigned { deal_id: DealId, by: Party },
    DealCompleted { deal_id: DealId },
    DealCancelled { deal_id: DealId },
}

/// Error from notification delivery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Push capability keyed by user id. The connection registry behind it is
/// externally owned; the core never sees transport handles. Delivery
/// failures are logged by the service and never fail the deal mutation.
#[async_trait::async_trait]
pub trait DealNotifier: Send + Sync {
    async fn notify(&self, user: &UserId, event: DealEvent) -> Result<(), NotifyError>;
}
