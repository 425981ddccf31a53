//! Password hashing helpers.

use rand::RngCore;

use crate::error::{AppError, Result};

/// Hash a password for storage.
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

/// Timing-safe comparison of a presented password against a stored hash.
///
/// Returns `false` for hashes that are not valid bcrypt output (such as the
/// random filler produced by [`unusable_hash`]), so federated-only accounts
/// always fail password verification.
#[must_use]
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

/// Random filler stored as the credential of accounts created by federated
/// sign-in. Not a bcrypt hash, so no password can ever verify against it.
#[must_use]
pub fn unusable_hash() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("Secret1!").unwrap();
        assert!(verify_password("Secret1!", &hash));
        assert!(!verify_password("Secret2!", &hash));
    }

    #[test]
    fn unusable_hash_never_verifies() {
        let hash = unusable_hash();
        assert!(!verify_password("", &hash));
        assert!(!verify_password(&hash, &hash));
        assert!(!verify_password("Secret1!", &hash));
    }

    #[test]
    fn unusable_hashes_are_unique() {
        assert_ne!(unusable_hash(), unusable_hash());
    }
}
