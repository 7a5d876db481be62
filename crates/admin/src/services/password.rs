//! Password hashing.
//!
//! Argon2id with a random salt, encoded as a PHC string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::models::HashedPassword;

/// Hashing a password failed.
#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct PasswordHashError;

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordHashError` if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<HashedPassword, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| HashedPassword::new(hash.to_string()))
        .map_err(|_| PasswordHashError)
}

/// Verify a password against a stored hash.
///
/// A stored value that is not a PHC string never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &HashedPassword) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash.as_str()) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
