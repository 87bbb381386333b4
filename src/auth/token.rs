use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::user::{UserRecord, UserRole};
use crate::constants::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, RESET_TOKEN_TTL_SECS};
use crate::error::{AuthError, Result};

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as usize
}

/// Identity claims embedded in access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,
    pub email: String,
    pub rol: UserRole,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
}

impl Claims {
    fn with_ttl(user: &UserRecord, ttl_secs: usize) -> Self {
        let now = unix_now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            rol: user.rol,
            iat: now,
            exp: now + ttl_secs,
        }
    }

    /// Claims for a short-lived access token
    pub fn access(user: &UserRecord) -> Self {
        Self::with_ttl(user, ACCESS_TOKEN_TTL_SECS)
    }

    /// Claims for a long-lived refresh token
    pub fn refresh(user: &UserRecord) -> Self {
        Self::with_ttl(user, REFRESH_TOKEN_TTL_SECS)
    }
}

/// Single-purpose claims for password-reset links. Only the email goes in;
/// a leaked reset token reveals no role or id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

impl ResetClaims {
    pub fn new(email: &str) -> Self {
        let now = unix_now();
        Self {
            email: email.to_string(),
            iat: now,
            exp: now + RESET_TOKEN_TTL_SECS,
        }
    }
}

/// Manages JWT operations for one signing secret.
/// The backend holds two: one for access (and reset) tokens, one for refresh
/// tokens.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    /// Creates a new token manager with a secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // No clock leeway; an expired token is expired
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a claims payload into a token string
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate signature and expiry, and decode the claims.
    /// Verification failures collapse to one generic message; the underlying
    /// cause is logged, not returned.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token verification failed: {}", e);
                AuthError::Unauthenticated("Token inválido o expirado.".to_string())
            })
    }
}

/// Extracts bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    auth_header
        .strip_prefix("Bearer ")
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.to_string())
}
