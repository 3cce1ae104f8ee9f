//! Password hashing and one-time reset codes

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;

/// Lifetime of a password reset code
pub const RESET_CODE_TTL_MINUTES: i64 = 15;

/// Reset codes are five decimal digits
const RESET_CODE_MIN: u32 = 10_000;
const RESET_CODE_MAX: u32 = 99_999;

/// Credential handling failures
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// Kind of persisted one-time token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    PasswordReset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::PasswordReset => "password_reset",
        }
    }
}

/// Hash a password with Argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Compare a candidate password against a stored digest
///
/// A digest that cannot be parsed never matches.
pub fn verify_password(candidate: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Generate a five digit numeric reset code
pub fn generate_reset_code() -> String {
    rand::thread_rng()
        .gen_range(RESET_CODE_MIN..=RESET_CODE_MAX)
        .to_string()
}

/// Expiry of a reset code issued at `issued_at`
pub fn reset_code_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::minutes(RESET_CODE_TTL_MINUTES)
}
