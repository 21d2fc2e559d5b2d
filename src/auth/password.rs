// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::OnceLock;

use crate::error::AppError;

/// Hashes a password with Argon2 and a fresh random salt (PHC string format).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

#[cfg(test)]
thread_local! {
    static VERIFICATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of verifications run on the current thread.
#[cfg(test)]
pub(crate) fn verification_count() -> usize {
    VERIFICATIONS.with(|c| c.get())
}

/// Returns `false` for a wrong password and for a hash that does not parse.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    #[cfg(test)]
    VERIFICATIONS.with(|c| c.set(c.get() + 1));

    let Ok(parsed_hash) = PasswordHash::new(hashed_password) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("petra-dummy-credential").ok())
        .as_deref()
}

/// Verifies `password` against a fixed throwaway hash.
///
/// Login calls this when there is no usable stored hash, so a failed
/// lookup costs as much as a wrong password.
pub fn verify_dummy_password(password: &str) {
    match dummy_hash() {
        Some(hash) => {
            verify_password(password, hash);
        }
        None => tracing::error!("Dummy password hash unavailable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("test-password").unwrap();

        assert_ne!(hashed, "test-password");
        assert!(verify_password("test-password", &hashed));
        assert!(!verify_password("wrong-password", &hashed));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();

        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_near_misses_rejected() {
        let hashed = hash_password("Secret1!").unwrap();

        for candidate in ["secret1!", "Secret1", "Secret1! ", " Secret1!", "Secret1!\0", ""] {
            assert!(!verify_password(candidate, &hashed), "{:?}", candidate);
        }
    }

    #[test]
    fn test_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_dummy_verification_runs_argon2() {
        let before = verification_count();
        verify_dummy_password("whatever");
        verify_dummy_password("whatever");
        assert_eq!(verification_count() - before, 2);
        assert!(dummy_hash().unwrap().starts_with("$argon2"));
    }
}
