//! # Deal Crypto
//!
//! Canonical serialization and signature verification for the two-party
//! deal-signing protocol.
//!
//! ## Architecture
//!
//! Everything in this crate is a stateless pure function taking all inputs
//! explicitly; there are no module-level singletons and no I/O:
//!
//! - [`canonical`]: deterministic byte form of the deal core both parties
//!   sign over
//! - [`verify`]: RSA-SHA256 (PKCS#1 v1.5) verification with base64/base64url
//!   normalization
//!
//! ## Security Notes
//!
//! - Signer and verifier MUST build the canonical bytes through
//!   [`canonical::canonicalize`]; a schema divergence between the two sides
//!   is the most common cause of verification failures.
//! - A structurally valid signature that does not match the canonical data
//!   verifies to `Ok(false)`; malformed keys or undecodable signatures are
//!   hard errors.

pub mod canonical;
pub mod errors;
pub mod test_support;
pub mod verify;

pub use canonical::{canonicalize, DealCore};
pub use errors::SignatureError;
pub use verify::{normalize_signature_base64, parse_public_key_pem, verify_rsa_sha256};
