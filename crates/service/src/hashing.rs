//! One-way salted password hashing used on user creation.

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

pub trait CredentialHasher: Send + Sync {
    /// Hash with a fresh random salt; the output is a self-describing PHC string.
    fn hash(&self, plaintext: &str) -> Result<String, ServiceError>;
}

/// argon2id with library defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }
}

/// Check a plaintext against a stored PHC string.
#[cfg(test)]
pub(crate) fn verify(plaintext: &str, hash: &str) -> bool {
    use argon2::{password_hash::PasswordVerifier, PasswordHash};
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(plaintext.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let h = Argon2Hasher;
        let a = h.hash("123456789").unwrap();
        let b = h.hash("123456789").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("123456789"));
        assert!(verify("123456789", &a));
        assert!(!verify("wrong-password", &a));
        assert!(!verify("123456789", "not-a-phc-string"));
    }
}
