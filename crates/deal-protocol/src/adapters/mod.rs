//! Adapters implementing the deal protocol ports.

pub mod keys;
pub mod memory;
pub mod notify;

pub use keys::RegistryKeyDirectory;
pub use memory::{InMemoryDealRepository, InMemoryPropertyCatalog};
pub use notify::{NullNotifier, RecordingNotifier};
