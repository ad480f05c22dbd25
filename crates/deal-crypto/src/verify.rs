//! # RSA-SHA256 Signature Verification
//!
//! Pure verification logic for deal signatures.
//!
//! Signing clients produce an RSA PKCS#1 v1.5 signature over the SHA-256
//! digest of the canonical deal core and transmit it as base64 or base64url.
//! Verification normalizes the encoding, decodes, and checks the signature
//! against the signer's registered SPKI PEM public key.

use crate::errors::SignatureError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

/// PEM delimiters required for registered public keys (SPKI).
pub const PEM_BEGIN: &str = "-----BEGIN PUBLIC KEY-----";
pub const PEM_END: &str = "-----END PUBLIC KEY-----";

/// Parse an SPKI PEM public key, enforcing the expected markers.
///
/// # Errors
/// * `EmptyKey` - the key is empty or whitespace-only
/// * `InvalidPemMarkers` - the expected BEGIN/END delimiters are missing
/// * `KeyParse` - the PEM body is not a valid RSA public key structure
pub fn parse_public_key_pem(public_key_pem: &str) -> Result<RsaPublicKey, SignatureError> {
    let trimmed = public_key_pem.trim();
    if trimmed.is_empty() {
        return Err(SignatureError::EmptyKey);
    }
    if !trimmed.contains(PEM_BEGIN) || !trimmed.contains(PEM_END) {
        return Err(SignatureError::InvalidPemMarkers);
    }

    RsaPublicKey::from_public_key_pem(trimmed)
        .map_err(|e| SignatureError::KeyParse(e.to_string()))
}

/// Normalize a base64url signature to standard base64 with padding.
///
/// `-`/`_` are mapped to `+`/`/` and `=` padding is restored to a valid
/// length. Already-standard base64 passes through unchanged.
pub fn normalize_signature_base64(signature_value: &str) -> String {
    let mut normalized: String = signature_value
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    let pad = (4 - normalized.len() % 4) % 4;
    for _ in 0..pad {
        normalized.push('=');
    }
    normalized
}

/// Verify an RSA-SHA256 signature over canonical deal bytes.
///
/// Returns `Ok(true)` when the signature matches, `Ok(false)` for a
/// structurally valid but non-matching signature, and `Err` for malformed
/// key or signature input.
pub fn verify_rsa_sha256(
    public_key_pem: &str,
    canonical: &[u8],
    signature_value: &str,
) -> Result<bool, SignatureError> {
    let public_key = parse_public_key_pem(public_key_pem)?;

    if signature_value.trim().is_empty() {
        return Err(SignatureError::EmptySignature);
    }

    let normalized = normalize_signature_base64(signature_value);
    let signature = STANDARD
        .decode(&normalized)
        .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;

    let digest = Sha256::digest(canonical);
    Ok(public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
        .is_ok())
}
