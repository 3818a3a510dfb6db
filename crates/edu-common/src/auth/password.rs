//! Password hashing and verification utilities
//!
//! Uses Argon2id with a random salt per hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validate password strength
///
/// Requires 8 to 128 characters with at least one letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters long"
        )));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(AppError::Validation(
            "Password must contain at least one letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("library42").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, hash_password("library42").unwrap());

        assert!(verify_password("library42", &hash).unwrap());
        assert!(!verify_password("library43", &hash).unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_internal_error() {
        assert!(matches!(
            verify_password("library42", "not-a-hash"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("library42").is_ok());
        assert!(validate_password_strength("Abcdefg1").is_ok());

        for (weak, fragment) in [
            ("short1", "at least 8"),
            ("onlyletters", "digit"),
            ("1234567890", "letter"),
        ] {
            match validate_password_strength(weak) {
                Err(AppError::Validation(msg)) => assert!(msg.contains(fragment), "{msg}"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }

        let long = format!("a1{}", "x".repeat(200));
        assert!(validate_password_strength(&long).is_err());
    }
}
