//! Key directory adapter backed by the key registry service.

use crate::ports::outbound::{KeyDirectory, KeyDirectoryError};
use key_registry::domain::errors::KeyError;
use key_registry::ports::KeyStore;
use key_registry::service::KeyRegistry;
use shared_types::UserId;
use std::sync::Arc;

/// `KeyDirectory` over a shared `KeyRegistry`.
pub struct RegistryKeyDirectory<S: KeyStore> {
    registry: Arc<KeyRegistry<S>>,
}

impl<S: KeyStore> RegistryKeyDirectory<S> {
    pub fn new(registry: Arc<KeyRegistry<S>>) -> Self {
        Self { registry }
    }
}

impl<S: KeyStore> Clone for RegistryKeyDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

#[async_trait::async_trait]
impl<S: KeyStore> KeyDirectory for RegistryKeyDirectory<S> {
    async fn public_key_pem(&self, user: &UserId) -> Result<String, KeyDirectoryError> {
        self.registry.public_key_pem(user).await.map_err(|e| match e {
            KeyError::NotFound(user) => KeyDirectoryError::NotFound(user),
            other => KeyDirectoryError::Unavailable(other.to_string()),
        })
    }
}
