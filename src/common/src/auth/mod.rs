//! Authentication for the Admin API
//!
//! Bearer tokens are HS256 JWTs carrying the user id and email. Passwords
//! are stored as argon2 hashes. The axum middleware in [`middleware`]
//! validates tokens and makes the authenticated user available to
//! handlers through request extensions.

pub mod authenticator;
pub mod middleware;

pub use authenticator::Authenticator;
pub use middleware::{CurrentUserExtractor, auth_middleware};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Authenticated user attached to a request after token validation
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User id (the token subject)
    pub id: i64,
    /// User email
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Whether the user has admin rights
    pub is_admin: bool,
}

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: i64,
    /// User email
    pub email: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user expiring `expires_in` from now
    pub fn new(user_id: i64, email: &str, expires_in: std::time::Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            email: email.to_string(),
            iat: now,
            exp: now + expires_in.as_secs() as i64,
        }
    }
}

/// Signing and verification keys for access tokens
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Sign the given claims into a token string
    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return its claims; expired or tampered tokens fail
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::unauthorized("Invalid or expired token"))
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Authentication error with HTTP status code
#[derive(Debug, Clone)]
pub struct AuthError {
    /// HTTP status code (400, 401, 403, 500)
    pub status_code: u16,
    /// Error message for the client
    pub message: String,
}

impl AuthError {
    /// Create a 400 Bad Request error (malformed Authorization header)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status_code: 400,
            message: message.into(),
        }
    }

    /// Create a 401 Unauthorized error (missing/invalid token)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status_code: 401,
            message: message.into(),
        }
    }

    /// Create a 403 Forbidden error (valid token but disallowed account)
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status_code: 403,
            message: message.into(),
        }
    }

    /// Create a 500 error (authentication backend failure)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_token_roundtrip() {
        let keys = JwtKeys::new(b"test-secret");
        let claims = Claims::new(42, "op@cadastro.local", Duration::from_secs(3600));
        let token = keys.issue(&claims).unwrap();

        let decoded = keys.verify(&token).unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.email, "op@cadastro.local");
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let keys = JwtKeys::new(b"test-secret");
        let claims = Claims::new(1, "op@cadastro.local", Duration::from_secs(3600));
        let token = keys.issue(&claims).unwrap();

        let other = JwtKeys::new(b"other-secret");
        let err = other.verify(&token).unwrap_err();
        assert_eq!(err.status_code, 401);
    }

    #[test]
    fn test_auth_error_constructors() {
        assert_eq!(AuthError::bad_request("x").status_code, 400);
        assert_eq!(AuthError::unauthorized("x").status_code, 401);
        assert_eq!(AuthError::forbidden("x").status_code, 403);
        assert_eq!(AuthError::internal("x").status_code, 500);
    }

    #[test]
    fn test_auth_error_display() {
        let error = AuthError::unauthorized("Invalid or expired token");
        assert_eq!(error.to_string(), "401: Invalid or expired token");
    }
}
