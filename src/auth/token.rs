//! Bearer credential issuing and verification.
//!
//! The core trusts the verdict of this module: a token that verifies
//! yields the caller's identity and role, nothing else is consulted.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{Role, UserRecord};
use crate::error::ApiError;

/// JWT claims carried by every issued credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id in canonical UUID form.
    pub sub: String,
    /// Login email at issue time.
    pub email: String,
    /// Role at issue time.
    pub role: Role,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// HS256 key pair plus token lifetime.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// Builds keys from the shared secret.
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a signed token for the given account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if signing fails.
    pub fn issue(&self, user: &UserRecord) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on any signature, format, or
    /// expiry problem.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_user(role: Role) -> UserRecord {
        UserRecord::new(
            "kirti@example.com".to_string(),
            "$2b$10$hash".to_string(),
            "Kirti S".to_string(),
            role,
        )
    }

    #[test]
    fn issue_then_verify_round_trips_identity() {
        let keys = TokenKeys::new("unit-test-secret", 24);
        let user = make_user(Role::Admin);

        let token = keys.issue(&user);
        let Ok(token) = token else {
            panic!("issue failed");
        };

        let claims = keys.verify(&token);
        let Ok(claims) = claims else {
            panic!("verify failed");
        };
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = TokenKeys::new("unit-test-secret", 24);
        let user = make_user(Role::User);
        let Ok(token) = keys.issue(&user) else {
            panic!("issue failed");
        };

        let mut tampered = token;
        tampered.push('x');
        assert!(keys.verify(&tampered).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenKeys::new("secret-a", 24);
        let verifier = TokenKeys::new("secret-b", 24);
        let Ok(token) = issuer.issue(&make_user(Role::User)) else {
            panic!("issue failed");
        };
        assert!(verifier.verify(&token).is_err());
    }
}
