//! Ports layer: the inbound protocol API and the outbound dependencies.

pub mod inbound;
pub mod outbound;

pub use inbound::DealProtocolApi;
pub use outbound::{
    CatalogError, DealEvent, DealNotifier, DealRepository, InsertOutcome, KeyDirectory,
    KeyDirectoryError, NotifyError, PropertyCatalog, RepositoryError,
};
