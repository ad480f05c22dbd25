//! # PEM Validation
//!
//! Registration-time validation of submitted public keys. Stricter than the
//! verification path: the PEM must start and end with the expected markers,
//! not merely contain them, and the body must parse as an RSA public key.

use crate::domain::errors::KeyError;
use deal_crypto::verify::{PEM_BEGIN, PEM_END};
use deal_crypto::{parse_public_key_pem, SignatureError};

/// Validate a submitted SPKI PEM public key.
pub fn validate_public_key_pem(public_key_pem: &str) -> Result<(), KeyError> {
    let trimmed = public_key_pem.trim();
    if trimmed.is_empty() {
        return Err(KeyError::InvalidKeyFormat("public key is empty".into()));
    }
    if !trimmed.starts_with(PEM_BEGIN) || !trimmed.ends_with(PEM_END) {
        return Err(KeyError::InvalidKeyFormat(
            "public key is not delimited by PEM public-key markers".into(),
        ));
    }

    match parse_public_key_pem(trimmed) {
        Ok(_) => Ok(()),
        Err(SignatureError::KeyParse(msg)) => Err(KeyError::InvalidKeyFormat(msg)),
        Err(other) => Err(KeyError::InvalidKeyFormat(other.to_string())),
    }
}
