//! # Key Registry
//!
//! Stores and retrieves one RSA public key per user identity.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): PEM validation and the key record, no I/O
//! - **Ports Layer** (`ports/`): the `KeyStore` persistence trait
//! - **Adapters** (`adapters/`): in-memory store implementation
//! - **Service Layer** (`service.rs`): registration authorization + upsert
//!
//! ## Design Limitation
//!
//! Re-registration overwrites the stored key; no history of prior keys is
//! retained. A signature recorded under an old key will no longer verify;
//! the deal protocol treats that as a hard `StaleCounterpartSignature`
//! failure rather than silently accepting the stale slot.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::InMemoryKeyStore;
pub use domain::errors::KeyError;
pub use domain::record::PublicKeyRecord;
pub use ports::{KeyStore, KeyStoreError};
pub use service::KeyRegistry;
