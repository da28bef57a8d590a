//! Credential generation and Argon2id password hashing.
//!
//! Hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) is
//! prepended to the password before hashing and verification.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::error::{KeygateError, KeygateResult};

/// Length of generated usernames.
pub const USERNAME_LEN: usize = 12;

/// Generate a derived-credential username: lowercase alphanumerics.
pub fn generate_username() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(USERNAME_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Generate a random password (32 bytes, base64url without padding).
pub fn generate_password() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn argon2() -> KeygateResult<Argon2<'static>> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| KeygateError::Crypto(format!("argon2 params error: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

fn peppered(password: &str, pepper: Option<&str>) -> String {
    match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    }
}

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str, pepper: Option<&str>) -> KeygateResult<String> {
    let input = peppered(password, pepper);
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2()?
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| KeygateError::Crypto(format!("password hash error: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a PHC-format hash.
///
/// Returns `Ok(false)` on mismatch and `Err(KeygateError::Crypto)` only
/// when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> KeygateResult<bool> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| KeygateError::Crypto(format!("invalid hash format: {e}")))?;
    let input = peppered(password, pepper);

    match Argon2::default().verify_password(input.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(KeygateError::Crypto(format!("verify error: {e}"))),
    }
}
