//! # Test Support
//!
//! RSA keypair generation and signing helpers for tests across the
//! workspace. The production core only ever verifies; signing happens on
//! client devices, so these helpers are the stand-in for a signing client.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256};

pub use rsa::RsaPrivateKey;

/// Key size used by signing clients.
pub const RSA_KEY_BITS: usize = 2048;

/// Generate an RSA-2048 keypair, returning the private key and the SPKI PEM
/// form of the public key (the form clients register).
pub fn generate_keypair() -> (RsaPrivateKey, String) {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).expect("RSA key generation failed");
    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("PEM encoding failed");
    (private_key, public_pem)
}

/// Sign canonical bytes the way a client does: RSA PKCS#1 v1.5 over the
/// SHA-256 digest, standard base64 output.
pub fn sign_canonical(private_key: &RsaPrivateKey, canonical: &[u8]) -> String {
    STANDARD.encode(raw_signature(private_key, canonical))
}

/// Same signature, encoded as unpadded base64url (as produced by browser
/// `SubtleCrypto` exports).
pub fn sign_canonical_base64url(private_key: &RsaPrivateKey, canonical: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(raw_signature(private_key, canonical))
}

fn raw_signature(private_key: &RsaPrivateKey, canonical: &[u8]) -> Vec<u8> {
    let digest = Sha256::digest(canonical);
    private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .expect("signing failed")
}
