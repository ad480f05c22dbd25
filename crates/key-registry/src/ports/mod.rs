//! # Ports
//!
//! Persistence trait the key registry depends on.

use crate::domain::record::PublicKeyRecord;
use shared_types::{Timestamp, UserId};
use thiserror::Error;

/// Error from the backing key store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyStoreError {
    /// A lock guarding the store was poisoned.
    #[error("Key store lock poisoned")]
    LockPoisoned,

    /// Backend-specific failure.
    #[error("Key store backend error: {0}")]
    Backend(String),
}

/// Persistence abstraction for public key records, unique on user id.
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert or overwrite the key for a user. On overwrite the original
    /// `created_at` is preserved and `updated_at` is set to `now`.
    async fn upsert(
        &self,
        user_id: UserId,
        public_key_pem: String,
        now: Timestamp,
    ) -> Result<PublicKeyRecord, KeyStoreError>;

    /// Fetch the record for a user, if any.
    async fn find(&self, user_id: &UserId) -> Result<Option<PublicKeyRecord>, KeyStoreError>;
}
