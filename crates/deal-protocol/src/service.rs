//! # Deal Protocol Service
//!
//! Orchestrates deal creation, two-party signing, status transitions, and
//! the availability projection onto the property catalog. All state lives
//! behind the outbound ports; the service itself holds no locks, so
//! concurrent requests are serialized only by the repository's conditional
//! updates.

use crate::domain::availability::property_status_for;
use crate::domain::entities::{
    CreateDealRequest, Deal, DealSignatures, DealStatus, DealStatusQuery, DealStatusView,
    DealTemplate, Party, Payment, PaymentRequest, PaymentStatus, Review, ReviewRequest,
    SignDealRequest, SignatureSlot,
};
use crate::domain::errors::DealError;
use crate::ports::inbound::DealProtocolApi;
use crate::ports::outbound::{
    CatalogError, DealEvent, DealNotifier, DealRepository, InsertOutcome, KeyDirectory,
    KeyDirectoryError, PropertyCatalog, RepositoryError,
};
use chrono::Utc;
use deal_crypto::{canonicalize, verify_rsa_sha256, DealCore, SignatureError};
use shared_types::{DealId, PropertyId, PropertySnapshot, UserId};
use tracing::{info, warn};

fn catalog_err(e: CatalogError) -> DealError {
    DealError::Catalog(e.to_string())
}

fn storage_err(e: RepositoryError) -> DealError {
    match e {
        RepositoryError::ConcurrentUpdate(msg) => DealError::Conflict(msg),
        other => DealError::Storage(other.to_string()),
    }
}

fn key_err(e: KeyDirectoryError) -> DealError {
    match e {
        KeyDirectoryError::NotFound(user) => DealError::PublicKeyNotFound(user),
        KeyDirectoryError::Unavailable(msg) => DealError::Storage(msg),
    }
}

/// The deal protocol application service.
pub struct DealProtocol<R, C, K, N> {
    deals: R,
    catalog: C,
    keys: K,
    notifier: N,
}

impl<R, C, K, N> DealProtocol<R, C, K, N>
where
    R: DealRepository,
    C: PropertyCatalog,
    K: KeyDirectory,
    N: DealNotifier,
{
    pub fn new(deals: R, catalog: C, keys: K, notifier: N) -> Self {
        Self {
            deals,
            catalog,
            keys,
            notifier,
        }
    }

    // =========================================================================
    // SHARED STEPS
    // =========================================================================

    async fn property_snapshot(&self, id: &PropertyId) -> Result<PropertySnapshot, DealError> {
        self.catalog
            .snapshot(id)
            .await
            .map_err(catalog_err)?
            .ok_or_else(|| DealError::PropertyNotFound(id.clone()))
    }

    /// Verify `signature` over the canonical form of `core` against the
    /// signer's currently registered key.
    async fn verify_signature(
        &self,
        signer: &UserId,
        core: &DealCore,
        signature: &str,
    ) -> Result<(), DealError> {
        let pem = self.keys.public_key_pem(signer).await.map_err(key_err)?;
        let canonical = canonicalize(core)?;
        if verify_rsa_sha256(&pem, &canonical, signature)? {
            Ok(())
        } else {
            warn!(user = %signer, "deal signature failed verification");
            Err(DealError::Signature(SignatureError::VerificationFailed))
        }
    }

    /// Re-check the counterpart's recorded signature against their current
    /// key before completing. A counterpart slot that no longer verifies
    /// (key rotated since signing, key gone) is a hard failure.
    async fn counterpart_still_verifies(
        &self,
        deal: &Deal,
        counterpart: Party,
    ) -> Result<(), DealError> {
        let slot = deal.signatures.slot(counterpart);
        if !slot.is_signed() {
            return Ok(());
        }

        let verified = match (deal.party_user(counterpart), slot.signature.as_deref()) {
            (Some(user), Some(signature)) => match self.keys.public_key_pem(user).await {
                Ok(pem) => {
                    let canonical = canonicalize(&deal.core())?;
                    verify_rsa_sha256(&pem, &canonical, signature).unwrap_or(false)
                }
                Err(_) => false,
            },
            _ => false,
        };

        if verified {
            Ok(())
        } else {
            warn!(deal = %deal.id, %counterpart, "recorded counterpart signature no longer verifies");
            Err(DealError::StaleCounterpartSignature(counterpart))
        }
    }

    /// Push the deal's status onto the property's availability.
    async fn project_availability(&self, deal: &Deal) -> Result<(), DealError> {
        self.catalog
            .set_status(&deal.property_id, property_status_for(deal.status))
            .await
            .map_err(catalog_err)
    }

    /// Best-effort delivery to one user; failures are logged, never raised.
    async fn notify_one(&self, user: &UserId, event: DealEvent) {
        if let Err(e) = self.notifier.notify(user, event).await {
            warn!(user = %user, error = %e, "deal notification failed");
        }
    }

    /// Best-effort delivery to both parties of a deal.
    async fn notify_parties(&self, deal: &Deal, event: DealEvent) {
        for user in [Some(&deal.owner_id), deal.renter_id.as_ref()]
            .into_iter()
            .flatten()
        {
            self.notify_one(user, event.clone()).await;
        }
    }

    /// Handling for "an active deal already exists for this property": a
    /// fully signed deal is a conflict; an unsigned/half-signed one is
    /// returned unchanged (idempotent creation).
    fn existing_active_deal(&self, existing: Deal) -> Result<Deal, DealError> {
        if existing.is_fully_signed() {
            Err(DealError::Conflict(
                "property already has a fully signed deal".into(),
            ))
        } else {
            info!(deal = %existing.id, property = %existing.property_id, "returning existing active deal");
            Ok(existing)
        }
    }

    // =========================================================================
    // SIGNING CORE
    // =========================================================================

    /// Apply one signature by `requester` to `deal`. At most one signing per
    /// call; a lost conditional update surfaces as `Conflict`.
    async fn apply_signature(
        &self,
        requester: &UserId,
        deal: Deal,
        signature: &str,
    ) -> Result<Deal, DealError> {
        let Some(party) = deal.party_of(requester) else {
            warn!(deal = %deal.id, user = %requester, "signing by non-party rejected");
            return Err(DealError::Unauthorized);
        };
        if deal.status.is_terminal() {
            return Err(DealError::DealTerminal(deal.status));
        }
        if deal.signatures.slot(party).is_signed() {
            return Err(DealError::AlreadySigned);
        }

        // The availability projection needs the property to still exist.
        self.property_snapshot(&deal.property_id).await?;

        self.verify_signature(requester, &deal.core(), signature)
            .await?;
        self.counterpart_still_verifies(&deal, party.counterpart())
            .await?;

        let slot = SignatureSlot::signed_with(signature.to_owned(), Utc::now());
        let updated = self
            .deals
            .record_signature(&deal.id, party, slot)
            .await
            .map_err(storage_err)?;

        self.project_availability(&updated).await?;
        info!(deal = %updated.id, %party, status = %updated.status, "deal signed");

        if updated.status == DealStatus::Completed {
            self.notify_parties(
                &updated,
                DealEvent::DealCompleted {
                    deal_id: updated.id.clone(),
                },
            )
            .await;
        } else if let Some(user) = updated.party_user(party.counterpart()) {
            self.notify_one(
                user,
                DealEvent::DealSigned {
                    deal_id: updated.id.clone(),
                    by: party,
                },
            )
            .await;
        }

        Ok(updated)
    }

    /// Create-and-sign in one call (`create_on_sign` with no existing deal
    /// for the party triple).
    async fn create_and_sign(
        &self,
        requester: &UserId,
        request: &SignDealRequest,
    ) -> Result<Deal, DealError> {
        let snapshot = self.property_snapshot(&request.property_id).await?;
        if !snapshot.status.accepts_deals() {
            warn!(property = %request.property_id, status = %snapshot.status, "deal creation on unavailable property rejected");
            return Err(DealError::PropertyUnavailable {
                property: request.property_id.clone(),
                status: snapshot.status,
            });
        }
        if snapshot.owner_id != request.owner_id {
            return Err(DealError::OwnerMismatch);
        }
        if *requester != request.owner_id && *requester != request.renter_id {
            warn!(user = %requester, "deal creation by non-party rejected");
            return Err(DealError::Unauthorized);
        }
        let terms = request
            .terms
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                DealError::Validation("lease terms are required when creating a deal".into())
            })?;

        let now = Utc::now();
        let start_date = request.start_date.unwrap_or(now);
        let end_date = request
            .end_date
            .unwrap_or(start_date + chrono::Duration::days(DealTemplate::DEFAULT_LEASE_DAYS));
        if end_date <= start_date {
            return Err(DealError::Validation(
                "end date must be after start date".into(),
            ));
        }

        let core = DealCore::new(
            request.property_id.clone(),
            request.owner_id.clone(),
            Some(request.renter_id.clone()),
        );
        self.verify_signature(requester, &core, &request.signature)
            .await?;

        let party = if *requester == request.owner_id {
            Party::Owner
        } else {
            Party::Renter
        };
        let mut signatures = DealSignatures::unsigned();
        *signatures.slot_mut(party) =
            SignatureSlot::signed_with(request.signature.clone(), now);

        let deal = Deal {
            id: DealId::generate(),
            property_id: request.property_id.clone(),
            owner_id: request.owner_id.clone(),
            renter_id: Some(request.renter_id.clone()),
            start_date,
            end_date,
            monthly_rent: request
                .monthly_rent
                .unwrap_or(DealTemplate::DEFAULT_MONTHLY_RENT),
            security_deposit: request
                .security_deposit
                .unwrap_or(DealTemplate::DEFAULT_SECURITY_DEPOSIT),
            terms: terms.to_owned(),
            status: DealStatus::Pending,
            signatures,
            payments: vec![],
            reviews: vec![],
            created_at: now,
            updated_at: now,
        };

        match self
            .deals
            .insert_if_no_active(deal)
            .await
            .map_err(storage_err)?
        {
            InsertOutcome::Created(deal) => {
                self.project_availability(&deal).await?;
                info!(deal = %deal.id, property = %deal.property_id, %party, "deal created and signed");
                self.notify_parties(
                    &deal,
                    DealEvent::DealCreated {
                        deal_id: deal.id.clone(),
                    },
                )
                .await;
                if let Some(user) = deal.party_user(party.counterpart()) {
                    self.notify_one(
                        user,
                        DealEvent::DealSigned {
                            deal_id: deal.id.clone(),
                            by: party,
                        },
                    )
                    .await;
                }
                Ok(deal)
            }
            // Lost a creation race. If the winner is the same party triple,
            // this call's signature still applies to it.
            InsertOutcome::ActiveExists(existing) => {
                if existing.owner_id == request.owner_id
                    && existing.renter_id.as_ref() == Some(&request.renter_id)
                {
                    self.apply_signature(requester, existing, &request.signature)
                        .await
                } else {
                    Err(DealError::Conflict(
                        "an active deal already exists for this property".into(),
                    ))
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl<R, C, K, N> DealProtocolApi for DealProtocol<R, C, K, N>
where
    R: DealRepository,
    C: PropertyCatalog,
    K: KeyDirectory,
    N: DealNotifier,
{
    async fn create_deal(
        &self,
        requester: &UserId,
        request: CreateDealRequest,
    ) -> Result<Deal, DealError> {
        if request.terms.trim().is_empty() {
            return Err(DealError::Validation("lease terms must not be empty".into()));
        }
        if request.end_date <= request.start_date {
            return Err(DealError::Validation(
                "end date must be after start date".into(),
            ));
        }

        let snapshot = self.property_snapshot(&request.property_id).await?;
        if !snapshot.status.accepts_deals() {
            warn!(property = %request.property_id, status = %snapshot.status, "deal creation on unavailable property rejected");
            return Err(DealError::PropertyUnavailable {
                property: request.property_id,
                status: snapshot.status,
            });
        }
        if snapshot.owner_id != request.owner_id {
            return Err(DealError::OwnerMismatch);
        }
        if *requester != request.owner_id && request.renter_id.as_ref() != Some(requester) {
            warn!(user = %requester, "deal creation by non-party rejected");
            return Err(DealError::Unauthorized);
        }

        if let Some(existing) = self
            .deals
            .find_active_by_property(&request.property_id)
            .await
            .map_err(storage_err)?
        {
            return self.existing_active_deal(existing);
        }

        let now = Utc::now();
        let mut signatures = DealSignatures::unsigned();
        if let Some(signature) = &request.signature {
            let core = DealCore::new(
                request.property_id.clone(),
                request.owner_id.clone(),
                request.renter_id.clone(),
            );
            self.verify_signature(requester, &core, signature).await?;
            let party = if *requester == request.owner_id {
                Party::Owner
            } else {
                Party::Renter
            };
            *signatures.slot_mut(party) = SignatureSlot::signed_with(signature.clone(), now);
        }

        let deal = Deal {
            id: DealId::generate(),
            property_id: request.property_id,
            owner_id: request.owner_id,
            renter_id: request.renter_id,
            start_date: request.start_date,
            end_date: request.end_date,
            monthly_rent: request.monthly_rent,
            security_deposit: request.security_deposit,
            terms: request.terms,
            status: DealStatus::Pending,
            signatures,
            payments: vec![],
            reviews: vec![],
            created_at: now,
            updated_at: now,
        };

        let deal = match self
            .deals
            .insert_if_no_active(deal)
            .await
            .map_err(storage_err)?
        {
            InsertOutcome::Created(deal) => deal,
            InsertOutcome::ActiveExists(existing) => return self.existing_active_deal(existing),
        };

        self.project_availability(&deal).await?;
        info!(deal = %deal.id, property = %deal.property_id, "deal created");
        self.notify_parties(
            &deal,
            DealEvent::DealCreated {
                deal_id: deal.id.clone(),
            },
        )
        .await;
        Ok(deal)
    }

    async fn sign_deal(
        &self,
        requester: &UserId,
        request: SignDealRequest,
    ) -> Result<Deal, DealError> {
        if request.signature.trim().is_empty() {
            return Err(DealError::Validation("signature is required".into()));
        }

        let deal = if let Some(deal_id) = &request.deal_id {
            self.deals
                .find(deal_id)
                .await
                .map_err(storage_err)?
                .ok_or_else(|| DealError::DealNotFound(deal_id.clone()))?
        } else if request.create_on_sign {
            match self
                .deals
                .find_by_parties(&request.property_id, &request.owner_id, &request.renter_id)
                .await
                .map_err(storage_err)?
            {
                Some(deal) => deal,
                None => return self.create_and_sign(requester, &request).await,
            }
        } else {
            return Err(DealError::Validation("deal id is required".into()));
        };

        // The request must describe the deal it signs.
        if deal.property_id != request.property_id
            || deal.owner_id != request.owner_id
            || deal.renter_id.as_ref() != Some(&request.renter_id)
        {
            return Err(DealError::Validation(
                "deal details do not match the stored deal".into(),
            ));
        }

        self.apply_signature(requester, deal, &request.signature)
            .await
    }

    async fn deal_status(
        &self,
        requester: &UserId,
        query: DealStatusQuery,
    ) -> Result<DealStatusView, DealError> {
        let snapshot = self.property_snapshot(&query.property_id).await?;
        if let Some(owner_id) = &query.owner_id {
            if *owner_id != snapshot.owner_id {
                return Err(DealError::OwnerMismatch);
            }
        }
        let is_owner = *requester == snapshot.owner_id;
        let is_named_renter = query.renter_id.as_ref() == Some(requester);
        if !is_owner && !is_named_renter {
            return Err(DealError::Unauthorized);
        }

        if let Some(deal) = self
            .deals
            .find_active_by_property(&query.property_id)
            .await
            .map_err(storage_err)?
        {
            return Ok(DealStatusView::Existing(deal));
        }

        let now = Utc::now();
        Ok(DealStatusView::Template(DealTemplate {
            property_id: query.property_id,
            owner_id: snapshot.owner_id,
            renter_id: query.renter_id,
            start_date: now,
            end_date: now + chrono::Duration::days(DealTemplate::DEFAULT_LEASE_DAYS),
            monthly_rent: DealTemplate::DEFAULT_MONTHLY_RENT,
            security_deposit: DealTemplate::DEFAULT_SECURITY_DEPOSIT,
            terms: DealTemplate::DEFAULT_TERMS.to_owned(),
            signatures: DealSignatures::unsigned(),
        }))
    }

    async fn update_status(
        &self,
        requester: &UserId,
        deal_id: &DealId,
        status: DealStatus,
    ) -> Result<Deal, DealError> {
        let deal = self
            .deals
            .find(deal_id)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| DealError::DealNotFound(deal_id.clone()))?;
        if deal.party_of(requester).is_none() {
            warn!(deal = %deal_id, user = %requester, "status override by non-party rejected");
            return Err(DealError::Unauthorized);
        }
        if deal.status == status {
            return Ok(deal);
        }
        if deal.status.is_terminal() {
            return Err(DealError::DealTerminal(deal.status));
        }
        if status == DealStatus::Completed && !deal.is_fully_signed() {
            return Err(DealError::Validation(
                "cannot complete a deal before both parties have signed".into(),
            ));
        }

        let updated = self
            .deals
            .update_status(deal_id, status, Utc::now())
            .await
            .map_err(storage_err)?;
        self.project_availability(&updated).await?;
        info!(deal = %updated.id, status = %updated.status, "deal status updated");

        match updated.status {
            DealStatus::Completed => {
                self.notify_parties(
                    &updated,
                    DealEvent::DealCompleted {
                        deal_id: updated.id.clone(),
                    },
                )
                .await
            }
            DealStatus::Cancelled => {
                self.notify_parties(
                    &updated,
                    DealEvent::DealCancelled {
                        deal_id: updated.id.clone(),
                    },
                )
                .await
            }
            DealStatus::Pending => {}
        }
        Ok(updated)
    }

    async fn add_payment(
        &self,
        requester: &UserId,
        deal_id: &DealId,
        request: PaymentRequest,
    ) -> Result<Deal, DealError> {
        let deal = self
            .deals
            .find(deal_id)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| DealError::DealNotFound(deal_id.clone()))?;
        if deal.party_of(requester) != Some(Party::Renter) {
            warn!(deal = %deal_id, user = %requester, "payment by non-renter rejected");
            return Err(DealError::Unauthorized);
        }
        if request.amount == 0 {
            return Err(DealError::Validation(
                "payment amount must be positive".into(),
            ));
        }

        let now = Utc::now();
        let payment = Payment {
            amount: request.amount,
            due_date: request.due_date,
            paid_at: Some(now),
            status: PaymentStatus::Paid,
            payment_method: request.payment_method,
            transaction_id: request.transaction_id,
        };
        let updated = self
            .deals
            .append_payment(deal_id, payment, now)
            .await
            .map_err(storage_err)?;
        info!(deal = %deal_id, amount = request.amount, "payment recorded");
        Ok(updated)
    }

    async fn add_review(
        &self,
        requester: &UserId,
        deal_id: &DealId,
        request: ReviewRequest,
    ) -> Result<Deal, DealError> {
        let deal = self
            .deals
            .find(deal_id)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| DealError::DealNotFound(deal_id.clone()))?;
        if deal.party_of(requester).is_none() {
            return Err(DealError::Unauthorized);
        }
        if deal.status != DealStatus::Completed {
            return Err(DealError::Validation(
                "reviews are only allowed on completed deals".into(),
            ));
        }
        if !(1..=5).contains(&request.rating) {
            return Err(DealError::Validation(
                "rating must be between 1 and 5".into(),
            ));
        }
        if deal.has_review_by(requester) {
            return Err(DealError::Conflict(
                "user has already reviewed this deal".into(),
            ));
        }

        let now = Utc::now();
        let review = Review {
            user_id: requester.clone(),
            rating: request.rating,
            comment: request.comment,
            created_at: now,
        };
        self.deals
            .append_review(deal_id, review, now)
            .await
            .map_err(storage_err)
    }

    async fn get_deal(&self, requester: &UserId, deal_id: &DealId) -> Result<Deal, DealError> {
        let deal = self
            .deals
            .find(deal_id)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| DealError::DealNotFound(deal_id.clone()))?;
        if deal.party_of(requester).is_none() {
            return Err(DealError::Unauthorized);
        }
        Ok(deal)
    }

    async fn deals_for_user(&self, requester: &UserId) -> Result<Vec<Deal>, DealError> {
        self.deals
            .find_for_user(requester)
            .await
            .map_err(storage_err)
    }
}

// =============================================================================
// TESTS
// =============================================================================
