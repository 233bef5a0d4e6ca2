//! Salted SHA-256 credential hashing adapter.
//!
//! Stored form is `hex(salt)$hex(sha256(salt || password))`. The salt is 16
//! random bytes per credential, so equal passwords never share a stored form.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::user::PasswordHash;

const SALT_LEN: usize = 16;

/// [`PasswordHasher`] backed by salted SHA-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    /// Construct the hasher.
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

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let stored = format!("{}${}", hex::encode(salt), Self::digest(&salt, password));
        PasswordHash::new(stored).map_err(|err| PasswordHashError::new(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let (salt_hex, digest_hex) = hash
            .as_str()
            .split_once('$')
            .ok_or_else(|| PasswordHashError::new("stored credential is malformed"))?;
        let salt = hex::decode(salt_hex)
            .map_err(|err| PasswordHashError::new(format!("stored salt is malformed: {err}")))?;
        Ok(Self::digest(&salt, password) == digest_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_then_verify_accepts_same_password() {
        let hasher = Sha256PasswordHasher::new();
        let stored = hasher.hash("hunter2").expect("hashing succeeds");
        assert!(hasher.verify("hunter2", &stored).expect("verify succeeds"));
    }

    #[rstest]
    fn verify_rejects_wrong_password() {
        let hasher = Sha256PasswordHasher::new();
        let stored = hasher.hash("hunter2").expect("hashing succeeds");
        assert!(!hasher.verify("hunter3", &stored).expect("verify succeeds"));
    }

    #[rstest]
    fn equal_passwords_get_distinct_salts() {
        let hasher = Sha256PasswordHasher::new();
        let a = hasher.hash("same").expect("hashing succeeds");
        let b = hasher.hash("same").expect("hashing succeeds");
        assert_ne!(a, b);
    }

    #[rstest]
    fn verify_rejects_unsalted_stored_form() {
        let hasher = Sha256PasswordHasher::new();
        let stored = PasswordHash::new("no-dollar-separator").expect("non-empty");
        assert!(hasher.verify("anything", &stored).is_err());
    }
}
