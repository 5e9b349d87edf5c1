//! Password hashing with bcrypt.

use crate::error::ApiError;

/// Hashes a plaintext password at the default cost.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verifies a plaintext password against a stored hash.
///
/// Malformed hashes verify as `false` rather than erroring; a login
/// attempt against corrupt data should just fail.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_cycle() {
        let hash = hash_password("s3cret-pw");
        let Ok(hash) = hash else {
            panic!("hashing failed");
        };
        assert!(verify_password("s3cret-pw", &hash));
        assert!(!verify_password("wrong-pw", &hash));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
