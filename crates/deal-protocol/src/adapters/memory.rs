//! # In-Memory Adapters
//!
//! In-memory implementations of `DealRepository` and `PropertyCatalog`.
//!
//! The repository's conditional slot update runs inside a single write
//! critical section: precondition check, slot write, and status
//! recomputation are atomic with respect to other requests. A database
//! adapter would express the same contract as a conditional update keyed on
//! `signatures.<party>.signed == false` and `status == pending`.

use crate::domain::entities::{Deal, DealStatus, Party, Payment, Review, SignatureSlot};
use crate::ports::outbound::{
    CatalogError, DealRepository, InsertOutcome, PropertyCatalog, RepositoryError,
};
use shared_types::{DealId, PropertyId, PropertySnapshot, PropertyStatus, Timestamp, UserId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory deal repository. Clones share the same underlying store.
#[derive(Clone, Default)]
pub struct InMemoryDealRepository {
    deals: Arc<RwLock<HashMap<DealId, Deal>>>,
}

impl InMemoryDealRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_active(deal: &Deal) -> bool {
    matches!(deal.status, DealStatus::Pending | DealStatus::Completed)
}

#[async_trait::async_trait]
impl DealRepository for InMemoryDealRepository {
    async fn insert_if_no_active(&self, deal: Deal) -> Result<InsertOutcome, RepositoryError> {
        let mut deals = self
            .deals
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        if let Some(existing) = deals
            .values()
            .find(|d| d.property_id == deal.property_id && is_active(d))
        {
            return Ok(InsertOutcome::ActiveExists(existing.clone()));
        }

        let inserted = deal.clone();
        deals.insert(deal.id.clone(), deal);
        Ok(InsertOutcome::Created(inserted))
    }

    async fn find(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        let deals = self
            .deals
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(deals.get(id).cloned())
    }

    async fn find_active_by_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Option<Deal>, RepositoryError> {
        let deals = self
            .deals
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(deals
            .values()
            .find(|d| d.property_id == *property_id && is_active(d))
            .cloned())
    }

    async fn find_by_parties(
        &self,
        property_id: &PropertyId,
        owner_id: &UserId,
        renter_id: &UserId,
    ) -> Result<Option<Deal>, RepositoryError> {
        let deals = self
            .deals
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(deals
            .values()
            .find(|d| {
                d.property_id == *property_id
                    && d.owner_id == *owner_id
                    && d.renter_id.as_ref() == Some(renter_id)
            })
            .cloned())
    }

    async fn find_for_user(&self, user: &UserId) -> Result<Vec<Deal>, RepositoryError> {
        let deals = self
            .deals
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut matching: Vec<Deal> = deals
            .values()
            .filter(|d| d.owner_id == *user || d.renter_id.as_ref() == Some(user))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn record_signature(
        &self,
        id: &DealId,
        party: Party,
        slot: SignatureSlot,
    ) -> Result<Deal, RepositoryError> {
        let mut deals = self
            .deals
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let deal = deals.get_mut(id).ok_or(RepositoryError::NotFound)?;

        // Preconditions checked under the same lock as the write.
        if deal.status != DealStatus::Pending {
            return Err(RepositoryError::ConcurrentUpdate(format!(
                "deal is no longer pending (status: {})",
                deal.status
            )));
        }
        if deal.signatures.slot(party).is_signed() {
            return Err(RepositoryError::ConcurrentUpdate(format!(
                "{party} slot is already signed"
            )));
        }

        if let Some(at) = slot.signed_at {
            deal.updated_at = at;
        }
        *deal.signatures.slot_mut(party) = slot;
        if deal.signatures.both_signed() {
            deal.status = DealStatus::Completed;
        }

        Ok(deal.clone())
    }

    async fn update_status(
        &self,
        id: &DealId,
        status: DealStatus,
        now: Timestamp,
    ) -> Result<Deal, RepositoryError> {
        let mut deals = self
            .deals
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let deal = deals.get_mut(id).ok_or(RepositoryError::NotFound)?;
        deal.status = status;
        deal.updated_at = now;
        Ok(deal.clone())
    }

    async fn append_payment(
        &self,
        id: &DealId,
        payment: Payment,
        now: Timestamp,
    ) -> Result<Deal, RepositoryError> {
        let mut deals = self
            .deals
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let deal = deals.get_mut(id).ok_or(RepositoryError::NotFound)?;
        deal.payments.push(payment);
        deal.updated_at = now;
        Ok(deal.clone())
    }

    async fn append_review(
        &self,
        id: &DealId,
        review: Review,
        now: Timestamp,
    ) -> Result<Deal, RepositoryError> {
        let mut deals = self
            .deals
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let deal = deals.get_mut(id).ok_or(RepositoryError::NotFound)?;

        if deal.has_review_by(&review.user_id) {
            return Err(RepositoryError::ConcurrentUpdate(format!(
                "user {} has already reviewed this deal",
                review.user_id
            )));
        }

        deal.reviews.push(review);
        deal.updated_at = now;
        Ok(deal.clone())
    }
}

/// In-memory stand-in for the external property catalog. Clones share the
/// same underlying store.
#[derive(Clone, Default)]
pub struct InMemoryPropertyCatalog {
    properties: Arc<RwLock<HashMap<PropertyId, PropertySnapshot>>>,
}

impl InMemoryPropertyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a property (test/bootstrap convenience).
    pub fn insert(&self, snapshot: PropertySnapshot) {
        if let Ok(mut properties) = self.properties.write() {
            properties.insert(snapshot.id.clone(), snapshot);
        }
    }
}

#[async_trait::async_trait]
impl PropertyCatalog for InMemoryPropertyCatalog {
    async fn snapshot(&self, id: &PropertyId) -> Result<Option<PropertySnapshot>, CatalogError> {
        let properties = self
            .properties
            .read()
            .map_err(|_| CatalogError::LockPoisoned)?;
        Ok(properties.get(id).cloned())
    }

    async fn set_status(
        &self,
        id: &PropertyId,
        status: PropertyStatus,
    ) -> Result<(), CatalogError> {
        let mut properties = self
            .properties
            .write()
            .map_err(|_| CatalogError::LockPoisoned)?;
        match properties.get_mut(id) {
            Some(snapshot) => {
                // Monotonic against completion: a reordered pending
                // projection never downgrades a rented property.
                if !(snapshot.status == PropertyStatus::Rented
                    && status == PropertyStatus::Pending)
                {
                    snapshot.status = status;
                }
                Ok(())
            }
            None => Err(CatalogError::Backend(format!("unknown property {id}"))),
        }
    }
}
