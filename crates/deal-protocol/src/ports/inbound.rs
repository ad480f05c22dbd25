//! # Inbound Port (Driving Port / API)
//!
//! The protocol surface exposed to collaborators. Transport-agnostic: the
//! authenticated requester identity is supplied by the external auth layer
//! on every call.

use crate::domain::entities::{
    CreateDealRequest, Deal, DealStatus, DealStatusQuery, DealStatusView, PaymentRequest,
    ReviewRequest, SignDealRequest,
};
use crate::domain::errors::DealError;
use shared_types::{DealId, UserId};

/// The deal protocol API.
#[async_trait::async_trait]
pub trait DealProtocolApi: Send + Sync {
    /// Create a deal for a property. Idempotent while an active, not fully
    /// signed deal exists: that deal is returned unchanged.
    async fn create_deal(
        &self,
        requester: &UserId,
        request: CreateDealRequest,
    ) -> Result<Deal, DealError>;

    /// Sign a deal as the owner or renter party, optionally creating the
    /// deal in the same call. At most one signing is applied per call.
    async fn sign_deal(
        &self,
        requester: &UserId,
        request: SignDealRequest,
    ) -> Result<Deal, DealError>;

    /// The deal state for a property: the existing deal, or an unsaved
    /// template with defaults when none exists.
    async fn deal_status(
        &self,
        requester: &UserId,
        query: DealStatusQuery,
    ) -> Result<DealStatusView, DealError>;

    /// Manual status override by a deal party. Distinct from the signed
    /// path: no cryptographic re-verification is performed, but completing
    /// still requires both slots signed.
    async fn update_status(
        &self,
        requester: &UserId,
        deal_id: &DealId,
        status: DealStatus,
    ) -> Result<Deal, DealError>;

    /// Append a payment (renter only).
    async fn add_payment(
        &self,
        requester: &UserId,
        deal_id: &DealId,
        request: PaymentRequest,
    ) -> Result<Deal, DealError>;

    /// Append a review (parties only, completed deals only, one per user).
    async fn add_review(
        &self,
        requester: &UserId,
        deal_id: &DealId,
        request: ReviewRequest,
    ) -> Result<Deal, DealError>;

    /// Fetch a deal by id (parties only).
    async fn get_deal(&self, requester: &UserId, deal_id: &DealId) -> Result<Deal, DealError>;

    /// All deals where the requester is a party, newest first.
    async fn deals_for_user(&self, requester: &UserId) -> Result<Vec<Deal>, DealError>;
}
