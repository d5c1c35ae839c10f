//! Credential and session collaborators for the auth use cases.
//!
//! # Responsibility
//! - Hide password hashing behind [`CredentialHasher`].
//! - Track opaque session tokens issued at login.
//!
//! # Invariants
//! - Stored hashes are self-describing (`scheme$salt$digest`).
//! - Session tokens are random UUID v4 values and map to exactly one user.

use crate::model::user::UserId;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

const BLAKE3_SCHEME: &str = "blake3";

/// Password hashing collaborator.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Salted BLAKE3 digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Blake3Hasher {
    fn digest(salt: &str, password: &str) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hasher.finalize()
    }
}

impl CredentialHasher for Blake3Hasher {
    fn hash(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password);
        format!("{BLAKE3_SCHEME}${salt}${}", digest.to_hex())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.splitn(3, '$');
        let (Some(scheme), Some(salt), Some(hex)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        if scheme != BLAKE3_SCHEME {
            return false;
        }
        match blake3::Hash::from_hex(hex) {
            // `blake3::Hash` equality is constant-time.
            Ok(expected) => Self::digest(salt, password) == expected,
            Err(_) => false,
        }
    }
}

/// In-process registry of issued session tokens.
///
/// Tokens do not expire; they leave the registry only through [`Self::revoke`].
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, UserId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for `user_id`.
    pub fn issue(&self, user_id: UserId) -> String {
        let token = Uuid::new_v4();
        self.sessions.write().insert(token, user_id);
        token.to_string()
    }

    /// Resolves a token; malformed or unknown tokens yield `None`.
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        let token = Uuid::parse_str(token.trim()).ok()?;
        self.sessions.read().get(&token).copied()
    }

    /// Revokes a token. Returns whether it was active.
    pub fn revoke(&self, token: &str) -> bool {
        match Uuid::parse_str(token.trim()) {
            Ok(token) => self.sessions.write().remove(&token).is_some(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Blake3Hasher, CredentialHasher, SessionRegistry};

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hasher = Blake3Hasher;
        let stored = hasher.hash("password123");
        assert!(stored.starts_with("blake3$"));
        assert!(hasher.verify("password123", &stored));
        assert!(!hasher.verify("password124", &stored));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = Blake3Hasher;
        assert_ne!(hasher.hash("pw"), hasher.hash("pw"));
    }

    #[test]
    fn verify_rejects_malformed_hashes() {
        let hasher = Blake3Hasher;
        assert!(!hasher.verify("pw", "plaintext"));
        assert!(!hasher.verify("pw", "md5$salt$abcd"));
        assert!(!hasher.verify("pw", "blake3$salt$not-hex"));
    }

    #[test]
    fn sessions_resolve_until_revoked() {
        let registry = SessionRegistry::new();
        let token = registry.issue(7);
        assert_eq!(registry.resolve(&token), Some(7));
        assert!(registry.revoke(&token));
        assert_eq!(registry.resolve(&token), None);
        assert!(!registry.revoke(&token));
        assert_eq!(registry.resolve("not-a-token"), None);
    }
}
