//! # Deal Aggregate
//!
//! The deal document with its embedded signature slots, payments, and
//! reviews, plus the request/response types of the protocol surface.
//!
//! Statuses are closed enums with exhaustive matching at every transition
//! site, no free-form strings.

use deal_crypto::DealCore;
use serde::{Deserialize, Serialize};
use shared_types::{DealId, PropertyId, Timestamp, UserId};

/// The two signing parties of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Owner,
    Renter,
}

impl Party {
    /// The other signing party.
    pub fn counterpart(self) -> Self {
        match self {
            Self::Owner => Self::Renter,
            Self::Renter => Self::Owner,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Owner => "owner",
            Self::Renter => "renter",
        })
    }
}

/// Deal lifecycle status.
///
/// `Pending` is the initial state; `Completed` and `Cancelled` are
/// terminal. `Completed` holds if and only if both signature slots are
/// signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Pending,
    Completed,
    Cancelled,
}

impl DealStatus {
    /// Whether the deal admits further signature or status mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for DealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Per-party record of signed-state, timestamp, and signature value.
///
/// Once a slot is recorded as signed its signature value is never mutated;
/// the conditional repository update enforces this under concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSlot {
    pub signed: bool,
    pub signed_at: Option<Timestamp>,
    pub signature: Option<String>,
}

impl SignatureSlot {
    /// A fresh, unsigned slot.
    pub fn unsigned() -> Self {
        Self {
            signed: false,
            signed_at: None,
            signature: None,
        }
    }

    /// A slot signed with the given value at the given time.
    pub fn signed_with(signature: String, at: Timestamp) -> Self {
        Self {
            signed: true,
            signed_at: Some(at),
            signature: Some(signature),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }
}

/// The owner and renter signature slots of a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealSignatures {
    pub owner: SignatureSlot,
    pub renter: SignatureSlot,
}

impl DealSignatures {
    pub fn unsigned() -> Self {
        Self {
            owner: SignatureSlot::unsigned(),
            renter: SignatureSlot::unsigned(),
        }
    }

    pub fn slot(&self, party: Party) -> &SignatureSlot {
        match party {
            Party::Owner => &self.owner,
            Party::Renter => &self.renter,
        }
    }

    pub fn slot_mut(&mut self, party: Party) -> &mut SignatureSlot {
        match party {
            Party::Owner => &mut self.owner,
            Party::Renter => &mut self.renter,
        }
    }

    pub fn both_signed(&self) -> bool {
        self.owner.is_signed() && self.renter.is_signed()
    }
}

/// Status of an individual rent payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

/// A rent payment appended to a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: u64,
    pub due_date: Timestamp,
    pub paid_at: Option<Timestamp>,
    pub status: PaymentStatus,
    pub payment_method: String,
    pub transaction_id: String,
}

/// A post-completion review; at most one per user per deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: UserId,
    /// Rating in `[1, 5]`.
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
}

/// The deal aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub property_id: PropertyId,
    pub owner_id: UserId,
    /// Absent when the owner opens a deal without a named renter yet.
    pub renter_id: Option<UserId>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub monthly_rent: u64,
    pub security_deposit: u64,
    pub terms: String,
    pub status: DealStatus,
    pub signatures: DealSignatures,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Deal {
    /// Which party a user is in this deal, if any.
    pub fn party_of(&self, user: &UserId) -> Option<Party> {
        if *user == self.owner_id {
            Some(Party::Owner)
        } else if self.renter_id.as_ref() == Some(user) {
            Some(Party::Renter)
        } else {
            None
        }
    }

    /// The user id of a party, if present.
    pub fn party_user(&self, party: Party) -> Option<&UserId> {
        match party {
            Party::Owner => Some(&self.owner_id),
            Party::Renter => self.renter_id.as_ref(),
        }
    }

    /// The canonical core both parties sign over.
    pub fn core(&self) -> DealCore {
        DealCore::new(
            self.property_id.clone(),
            self.owner_id.clone(),
            self.renter_id.clone(),
        )
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signatures.both_signed()
    }

    /// Whether a user has already reviewed this deal.
    pub fn has_review_by(&self, user: &UserId) -> bool {
        self.reviews.iter().any(|r| r.user_id == *user)
    }
}

// =============================================================================
// PROTOCOL SURFACE TYPES
// =============================================================================

/// Request to create a deal.
#[derive(Debug, Clone)]
pub struct CreateDealRequest {
    pub property_id: PropertyId,
    pub owner_id: UserId,
    pub renter_id: Option<UserId>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub monthly_rent: u64,
    pub security_deposit: u64,
    pub terms: String,
    /// Optional creator signature over the canonical core, verified before
    /// the deal is persisted.
    pub signature: Option<String>,
}

/// Request to sign a deal (optionally creating it in the same call).
#[derive(Debug, Clone)]
pub struct SignDealRequest {
    /// Required unless `create_on_sign` resolves the deal by parties.
    pub deal_id: Option<DealId>,
    pub property_id: PropertyId,
    pub owner_id: UserId,
    pub renter_id: UserId,
    pub signature: String,
    /// When set and no deal exists for the parties, a deal is created
    /// as part of the signing call.
    pub create_on_sign: bool,
    /// Lease terms; required when `create_on_sign` actually creates.
    pub terms: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub monthly_rent: Option<u64>,
    pub security_deposit: Option<u64>,
}

/// Request to append a payment.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: u64,
    pub due_date: Timestamp,
    pub payment_method: String,
    pub transaction_id: String,
}

/// Request to append a review.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub rating: u8,
    pub comment: String,
}

/// Query for the deal state of a property.
#[derive(Debug, Clone)]
pub struct DealStatusQuery {
    pub property_id: PropertyId,
    /// When supplied, must match the property's recorded owner.
    pub owner_id: Option<UserId>,
    pub renter_id: Option<UserId>,
}

/// An unsaved deal pre-filled with defaults, returned when no deal exists
/// yet for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealTemplate {
    pub property_id: PropertyId,
    pub owner_id: UserId,
    pub renter_id: Option<UserId>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub monthly_rent: u64,
    pub security_deposit: u64,
    pub terms: String,
    pub signatures: DealSignatures,
}

impl DealTemplate {
    /// Defaults used when pre-filling a template (and when a signing call
    /// creates a deal without explicit amounts).
    pub const DEFAULT_MONTHLY_RENT: u64 = 1000;
    pub const DEFAULT_SECURITY_DEPOSIT: u64 = 1000;
    pub const DEFAULT_TERMS: &'static str = "Standard lease agreement";
    pub const DEFAULT_LEASE_DAYS: i64 = 365;
}

/// Result of a deal-status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealStatusView {
    /// A persisted deal exists for the property.
    Existing(Deal),
    /// No deal yet; a template with defaults for the client to sign.
    Template(DealTemplate),
}
