//! Password gate for the admin actions of the library.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no admin password is configured; run `arise-worship hash-password` and add admin_password_hash to the config")]
    NotConfigured,
    #[error("invalid password")]
    InvalidCredentials,
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// Hash `plain` with a fresh random salt, returning a PHC string.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| AuthError::Hashing(err.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|err| AuthError::MalformedHash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Proof that the operator entered the admin password. Mutating screens only
/// open while one is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    _private: (),
}

impl AdminSession {
    pub fn login(config: &AppConfig, plain: &str) -> Result<Self, AuthError> {
        let hash = config
            .admin_password_hash
            .as_deref()
            .filter(|hash| !hash.trim().is_empty())
            .ok_or(AuthError::NotConfigured)?;

        if verify_password(plain, hash.trim())? {
            log::info!("Admin session started");
            Ok(Self { _private: () })
        } else {
            log::warn!("Rejected admin login attempt");
            Err(AuthError::InvalidCredentials)
        }
    }
}
