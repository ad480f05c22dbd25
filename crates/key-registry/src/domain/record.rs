//! The per-user public key record.

use serde::{Deserialize, Serialize};
use shared_types::{Timestamp, UserId};

/// One registered public key per user. Overwritten on re-registration,
/// never deleted in normal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Owner of the key.
    pub user_id: UserId,
    /// SPKI PEM form of the RSA public key.
    pub public_key_pem: String,
    /// First registration time; preserved across overwrites.
    pub created_at: Timestamp,
    /// Last registration time.
    pub updated_at: Timestamp,
}
