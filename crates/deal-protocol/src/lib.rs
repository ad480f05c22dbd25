//! # Deal Protocol
//!
//! The dual-signature lease-agreement state machine. Two independent
//! parties, the property owner and a renter, sign the same canonical deal
//! core with their registered RSA keys; the protocol verifies each
//! signature, advances deal state, and keeps the linked property's
//! availability consistent with deal completion.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the `Deal` aggregate, status machine,
//!   and the availability mapping, no I/O
//! - **Ports Layer** (`ports/`): `DealProtocolApi` inbound trait; outbound
//!   traits for the deal repository, property catalog, key directory, and
//!   notifier
//! - **Adapters** (`adapters/`): in-memory repository/catalog, a key
//!   directory over the key registry, and notifier implementations
//! - **Service Layer** (`service.rs`): orchestration and authorization
//!
//! ## Concurrency
//!
//! Requests share the persistent store with no cross-request in-memory
//! locks. Signature slots are written through a conditional repository
//! update keyed on the slot being unsigned; a losing concurrent writer
//! observes `Conflict` and must re-read. The core never retries a signing
//! internally (at-most-one-signing-per-call).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::availability::property_status_for;
pub use domain::entities::{
    CreateDealRequest, Deal, DealSignatures, DealStatus, DealStatusQuery, DealStatusView,
    DealTemplate, Party, Payment, PaymentRequest, PaymentStatus, Review, ReviewRequest,
    SignDealRequest, SignatureSlot,
};
pub use domain::errors::DealError;
pub use ports::inbound::DealProtocolApi;
pub use ports::outbound::{
    CatalogError, DealEvent, DealNotifier, DealRepository, InsertOutcome, KeyDirectory,
    KeyDirectoryError, NotifyError, PropertyCatalog, RepositoryError,
};
pub use service::DealProtocol;
