//! Password hashing and verification using Argon2id

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use std::sync::LazyLock;

use crate::error::AppError;

/// Hash a password with a fresh random salt
///
/// # Returns
/// PHC-formatted hash string safe for database storage
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Encryption(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash
///
/// # Returns
/// `true` if password matches hash, `false` otherwise
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Encryption(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Encryption(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Hash checked when the username is unknown, so both paths cost one Argon2 verify
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("chirp-unknown-user-placeholder").ok());

/// Run a verification that can never succeed
///
/// Keeps the response time of a login for an unknown user in line with
/// a wrong password for a known one. Always returns `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
