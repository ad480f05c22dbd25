//! Shared fixtures: a fully wired protocol stack and signing users that
//! stand in for client devices holding private keys.

use deal_crypto::canonicalize;
use deal_crypto::test_support::{generate_keypair, sign_canonical, RsaPrivateKey};
use deal_protocol::adapters::{
    InMemoryDealRepository, InMemoryPropertyCatalog, RecordingNotifier, RegistryKeyDirectory,
};
use deal_protocol::{Deal, DealProtocol, PropertyCatalog};
use key_registry::{InMemoryKeyStore, KeyRegistry};
use shared_types::{PropertyId, PropertySnapshot, PropertyStatus, UserId};
use std::sync::Arc;

pub type Protocol = DealProtocol<
    InMemoryDealRepository,
    InMemoryPropertyCatalog,
    RegistryKeyDirectory<InMemoryKeyStore>,
    RecordingNotifier,
>;

/// The wired stack with handles onto its shared adapters.
pub struct Platform {
    pub protocol: Arc<Protocol>,
    pub registry: Arc<KeyRegistry<InMemoryKeyStore>>,
    pub catalog: InMemoryPropertyCatalog,
    pub notifier: RecordingNotifier,
}

impl Platform {
    pub fn new() -> Self {
        let registry = Arc::new(KeyRegistry::new(InMemoryKeyStore::new()));
        let catalog = InMemoryPropertyCatalog::new();
        let notifier = RecordingNotifier::new();
        let protocol = Arc::new(DealProtocol::new(
            InMemoryDealRepository::new(),
            catalog.clone(),
            RegistryKeyDirectory::new(Arc::clone(&registry)),
            notifier.clone(),
        ));
        Self {
            protocol,
            registry,
            catalog,
            notifier,
        }
    }

    /// Seed a property owned by `owner`, available for deals.
    pub fn seed_property(&self, id: &str, owner: &UserId) {
        self.catalog.insert(PropertySnapshot {
            id: PropertyId::from(id),
            owner_id: owner.clone(),
            status: PropertyStatus::Available,
        });
    }

    pub async fn property_status(&self, id: &str) -> PropertyStatus {
        self.catalog
            .snapshot(&PropertyId::from(id))
            .await
            .unwrap()
            .unwrap()
            .status
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}

/// A user with a registered keypair, signing on their own device.
pub struct SigningUser {
    pub id: UserId,
    key: RsaPrivateKey,
}

impl SigningUser {
    /// Generate a keypair and register its public half.
    pub async fn register(platform: &Platform, id: &str) -> Self {
        let (key, pem) = generate_keypair();
        let id = UserId::from(id);
        platform
            .registry
            .register(&id, &id, &pem)
            .await
            .expect("key registration failed");
        Self { id, key }
    }

    /// Rotate to a fresh keypair, overwriting the registered key.
    pub async fn rotate_key(&mut self, platform: &Platform) {
        let (key, pem) = generate_keypair();
        platform
            .registry
            .register(&self.id, &self.id, &pem)
            .await
            .expect("key rotation failed");
        self.key = key;
    }

    /// Sign the canonical core of a deal.
    pub fn sign(&self, deal: &Deal) -> String {
        sign_canonical(
            &self.key,
            &canonicalize(&deal.core()).expect("canonicalization failed"),
        )
    }
}

/// Install a test tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
