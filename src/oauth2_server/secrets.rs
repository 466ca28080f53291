// ABOUTME: Cryptographic helpers for OAuth 2.1 codes, tokens, client secrets, and PKCE
// ABOUTME: System RNG token generation, Argon2 secret hashing, and constant-time comparisons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppResult};
use crate::models::CodeChallengeMethod;

/// Generate `byte_len` random bytes encoded as unpadded URL-safe base64
///
/// # Errors
/// Returns an error if the system RNG fails. The server cannot issue
/// credentials safely without it.
pub fn generate_random_string(byte_len: usize) -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; byte_len];

    rng.fill(&mut bytes).map_err(|e| {
        tracing::error!(error = ?e, "SystemRandom failed - cannot generate secure random bytes");
        AppError::internal("System RNG failure - server cannot operate securely")
    })?;

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(&bytes))
}

/// Generate `byte_len` random bytes encoded as lowercase hex
///
/// # Errors
/// Returns an error if the system RNG fails
pub fn generate_hex_string(byte_len: usize) -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; byte_len];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::internal("System RNG failure - server cannot operate securely"))?;
    Ok(hex::encode(bytes))
}

/// Hash a client secret for storage using Argon2id with a random salt
///
/// # Errors
/// Returns an error if Argon2 hashing fails
pub fn hash_client_secret(secret: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Argon2 password hashing failed: {e}")))
}

/// Verify a presented client secret against its stored Argon2 hash
#[must_use]
pub fn verify_client_secret(presented: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        tracing::error!("Failed to parse stored client secret hash");
        return false;
    };
    Argon2::default()
        .verify_password(presented.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Compute the S256 challenge for a verifier: `BASE64URL(SHA256(verifier))`, unpadded
#[must_use]
pub fn s256_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Check a PKCE verifier against a stored challenge (RFC 7636 section 4.6)
#[must_use]
pub fn verify_pkce(verifier: &str, challenge: &str, method: CodeChallengeMethod) -> bool {
    let computed = match method {
        CodeChallengeMethod::S256 => s256_challenge(verifier),
        CodeChallengeMethod::Plain => verifier.to_owned(),
    };
    constant_time_eq(&computed, challenge)
}

/// Constant-time string equality
#[must_use]
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    left.as_bytes().ct_eq(right.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s256_matches_rfc7636_appendix_b() {
        assert_eq!(
            s256_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_verify_pkce_methods() {
        let challenge = s256_challenge("verifier123");
        assert!(verify_pkce("verifier123", &challenge, CodeChallengeMethod::S256));
        assert!(!verify_pkce("verifier124", &challenge, CodeChallengeMethod::S256));
        assert!(verify_pkce("plain-value", "plain-value", CodeChallengeMethod::Plain));
        assert!(!verify_pkce("plain-value", "other", CodeChallengeMethod::Plain));
    }

    #[test]
    fn test_secret_hash_round_trip() {
        let hash = hash_client_secret("s3cret").unwrap();
        assert!(verify_client_secret("s3cret", &hash));
        assert!(!verify_client_secret("wrong", &hash));
        assert!(!verify_client_secret("s3cret", "not-a-phc-string"));
    }

    #[test]
    fn test_random_strings_are_distinct() {
        let a = generate_random_string(32).unwrap();
        let b = generate_random_string(32).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert_eq!(generate_hex_string(16).unwrap().len(), 32);
    }
}
