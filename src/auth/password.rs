//! Password hashing primitives
//!
//! Wraps Argon2id for everything that gets compared against a stored hash:
//! account passwords, temporary invite passwords, and refresh tokens
//! (persisted server-side only as a hash).

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use rand::Rng;

use crate::constants::TEMP_PASSWORD_LEN;
use crate::error::{AuthError, Result};

/// Hash a secret with a fresh random salt
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Compare a secret against a stored hash.
/// An unparseable stored hash counts as a mismatch, not an error.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored hash could not be parsed: {}", e);
            false
        }
    }
}

/// Generate a random temporary password for the invite flow (hex-encoded)
pub fn generate_temp_password() -> String {
    let mut rng = rand::thread_rng();
    (0..TEMP_PASSWORD_LEN / 2)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}
