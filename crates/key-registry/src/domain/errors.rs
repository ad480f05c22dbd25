//! Error types for key registration and retrieval.

use shared_types::UserId;
use thiserror::Error;

/// Errors surfaced by the key registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The submitted key is not a valid SPKI PEM RSA public key.
    #[error("Invalid public key: {0}")]
    InvalidKeyFormat(String),

    /// No key is registered for the user.
    #[error("Public key not found for user {0}")]
    NotFound(UserId),

    /// The requester may only manage their own key.
    #[error("Not authorized to manage this user's public key")]
    Unauthorized,

    /// The backing store failed.
    #[error("Key store error: {0}")]
    Storage(String),
}
