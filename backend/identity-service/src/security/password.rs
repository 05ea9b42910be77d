//! Password hashing and verification using Argon2id.

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::error::{AppError, AppResult};

/// Hash a password for storage. Length policy is enforced at the request
/// layer, not here.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal("failed to hash password".to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash. A malformed stored hash is an
/// internal error, not a credential failure.
pub fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("invalid password hash format".to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::InvalidCredentials)
}
