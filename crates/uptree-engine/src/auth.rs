//! Credential hashing seam.
//!
//! The core never interprets a password hash; it stores whatever opaque
//! string the hasher produces and asks the hasher to verify it later. The
//! default implementation is a salted SHA-256 — swap in something heavier at
//! the trait seam without touching the ledger.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Hash and verify passwords. Implementations must be cheap to share across
/// threads; the service holds one behind a `Box<dyn ...>`.
pub trait CredentialHasher: Send + Sync {
    /// Produce an opaque hash string for storage.
    fn hash(&self, password: &str) -> String;

    /// Check `password` against a previously stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Default hasher: 16-byte random salt, SHA-256 over `salt || password`,
/// stored as `hex(salt)$hex(digest)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaltedSha256Hasher;

impl SaltedSha256Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn digest(salt: &[u8], password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl CredentialHasher for SaltedSha256Hasher {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        format!("{}${}", hex::encode(salt), Self::digest(&salt, password))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Some((salt_hex, digest_hex)) = hash.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        Self::digest(&salt, password) == digest_hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = SaltedSha256Hasher::new();
        let hash = hasher.hash("hunter22");
        assert!(hasher.verify("hunter22", &hash));
        assert!(!hasher.verify("hunter23", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = SaltedSha256Hasher::new();
        let a = hasher.hash("hunter22");
        let b = hasher.hash("hunter22");
        assert_ne!(a, b, "salts must differ");
        assert!(hasher.verify("hunter22", &a));
        assert!(hasher.verify("hunter22", &b));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let hasher = SaltedSha256Hasher::new();
        assert!(!hasher.verify("anything", "not-a-real-hash"));
        assert!(!hasher.verify("anything", "zz$zz"));
        assert!(!hasher.verify("anything", ""));
    }
}
