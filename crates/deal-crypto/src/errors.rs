//! # Signature Errors
//!
//! Error types for canonicalization and signature verification.

use thiserror::Error;

/// Errors that can occur during signature verification.
///
/// Malformed input (keys, encodings) is an error; an honest mismatch between
/// signature and data is reported as `Ok(false)` by the verify functions and
/// promoted to [`SignatureError::VerificationFailed`] by callers that treat
/// a mismatch as fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The public key is empty or whitespace-only.
    #[error("Public key is empty")]
    EmptyKey,

    /// The public key is not delimited by the expected PEM markers.
    #[error("Public key is not in valid PEM format")]
    InvalidPemMarkers,

    /// The PEM body does not parse as an RSA public key structure.
    #[error("Invalid public key format: {0}")]
    KeyParse(String),

    /// The signature value is empty.
    #[error("Signature is empty")]
    EmptySignature,

    /// The signature value is not decodable base64/base64url.
    #[error("Signature is not valid base64: {0}")]
    InvalidEncoding(String),

    /// The signature is well-formed but does not match the canonical data
    /// under the given public key.
    #[error("Signature verification failed")]
    VerificationFailed,

    /// The canonical core could not be serialized.
    #[error("Canonicalization failed: {0}")]
    Canonicalization(String),
}
