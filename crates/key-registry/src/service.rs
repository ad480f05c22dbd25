//! # Key Registry Service
//!
//! Wires PEM validation to the key store and enforces that users only
//! manage their own key. Registration is an idempotent overwrite by design;
//! see the crate docs for the rotation caveat.

use crate::domain::errors::KeyError;
use crate::domain::pem::validate_public_key_pem;
use crate::domain::record::PublicKeyRecord;
use crate::ports::KeyStore;
use shared_types::UserId;
use tracing::{info, warn};

/// Application service for key registration and retrieval.
pub struct KeyRegistry<S: KeyStore> {
    store: S,
}

impl<S: KeyStore> KeyRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Register (or overwrite) the public key for `user_id`.
    ///
    /// # Errors
    /// * `Unauthorized` - requester is not the key's owner
    /// * `InvalidKeyFormat` - PEM markers missing or body unparseable
    pub async fn register(
        &self,
        requester: &UserId,
        user_id: &UserId,
        public_key_pem: &str,
    ) -> Result<PublicKeyRecord, KeyError> {
        if requester != user_id {
            warn!(%requester, user = %user_id, "key registration for another user rejected");
            return Err(KeyError::Unauthorized);
        }

        validate_public_key_pem(public_key_pem)?;

        let record = self
            .store
            .upsert(
                user_id.clone(),
                public_key_pem.trim().to_owned(),
                chrono::Utc::now(),
            )
            .await
            .map_err(|e| KeyError::Storage(e.to_string()))?;

        info!(user = %user_id, "public key registered");
        Ok(record)
    }

    /// Fetch the key record for a user.
    pub async fn fetch(&self, user_id: &UserId) -> Result<PublicKeyRecord, KeyError> {
        self.store
            .find(user_id)
            .await
            .map_err(|e| KeyError::Storage(e.to_string()))?
            .ok_or_else(|| KeyError::NotFound(user_id.clone()))
    }

    /// Convenience accessor for the PEM string alone.
    pub async fn public_key_pem(&self, user_id: &UserId) -> Result<String, KeyError> {
        Ok(self.fetch(user_id).await?.public_key_pem)
    }
}
