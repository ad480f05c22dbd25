//! In-memory implementation of `KeyStore`.

use crate::domain::record::PublicKeyRecord;
use crate::ports::{KeyStore, KeyStoreError};
use shared_types::{Timestamp, UserId};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key store, one record per user.
#[derive(Default)]
pub struct InMemoryKeyStore {
    records: RwLock<HashMap<UserId, PublicKeyRecord>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn upsert(
        &self,
        user_id: UserId,
        public_key_pem: String,
        now: Timestamp,
    ) -> Result<PublicKeyRecord, KeyStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| KeyStoreError::LockPoisoned)?;

        let record = records
            .entry(user_id.clone())
            .and_modify(|existing| {
                existing.public_key_pem = public_key_pem.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| PublicKeyRecord {
                user_id,
                public_key_pem,
                created_at: now,
                updated_at: now,
            });

        Ok(record.clone())
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<PublicKeyRecord>, KeyStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| KeyStoreError::LockPoisoned)?;
        Ok(records.get(user_id).cloned())
    }
}
