//! Server configuration module
//! Handles environment-driven configuration for the auth backend

use crate::constants::{
    DEFAULT_CORS_ORIGIN, DEFAULT_HOST, DEFAULT_MAIL_FROM_NAME, DEFAULT_MAIL_HOST, DEFAULT_PORT,
};
use crate::error::{AuthError, Result};
use std::env;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Secret for signing/validating short-lived access tokens (also signs
    /// password-reset tokens)
    pub access_secret: String,
    /// Secret for signing/validating refresh tokens (separate from the access
    /// secret so a leak of one does not compromise the other)
    pub refresh_secret: String,
    /// Base URL of the hosted datastore (PostgREST dialect)
    pub supabase_url: String,
    /// Service key for the hosted datastore
    pub supabase_key: String,
    /// SMTP relay host
    pub mail_host: String,
    /// SMTP username, also used as the From address
    pub mail_user: String,
    /// SMTP password
    pub mail_pass: String,
    /// Display name on outgoing mail
    pub mail_from_name: String,
    /// Frontend base URL, used to build reset/login links in emails
    pub front_url: String,
    /// Allowed CORS origin (the frontend)
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            access_secret: "unit-testing-access-signing-key-0123456789".to_string(),
            refresh_secret: "unit-testing-refresh-signing-key-0123456789".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_key: "unit-testing-service-key".to_string(),
            mail_host: DEFAULT_MAIL_HOST.to_string(),
            mail_user: "noreply@example.com".to_string(),
            mail_pass: "unit-testing-mail-pass".to_string(),
            mail_from_name: DEFAULT_MAIL_FROM_NAME.to_string(),
            front_url: "http://localhost:5173".to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }

    /// Validate that a signing secret meets security requirements
    fn validate_secret(secret: &str, secret_type: &str) -> Result<()> {
        if secret.len() < 32 {
            return Err(AuthError::ConfigError(format!(
                "{} secret must be at least 32 characters long",
                secret_type
            )));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "mysecretkey",
            "default",
            "secret",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if secret.contains(pattern) {
                return Err(AuthError::ConfigError(format!(
                    "{} secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    secret_type, pattern
                )));
            }
        }

        Ok(())
    }

    /// Ensure access and refresh secrets are different
    fn validate_secrets_are_different(access: &str, refresh: &str) -> Result<()> {
        if access == refresh {
            return Err(AuthError::ConfigError(
                "JWT_SECRET and JWT_REFRESH_SECRET must be different. Using the same secret for both token kinds lets a stolen refresh token forge access tokens.".to_string(),
            ));
        }
        Ok(())
    }

    fn required(name: &str) -> Result<String> {
        env::var(name).map_err(|_| {
            AuthError::ConfigError(format!("{} environment variable is required", name))
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = env::var("LCA_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let access_secret = Self::required("JWT_SECRET")?;
        let refresh_secret = Self::required("JWT_REFRESH_SECRET")?;

        let supabase_url = Self::required("SUPABASE_URL")?;
        let supabase_key = Self::required("SUPABASE_KEY")?;

        let mail_host = env::var("MAIL_HOST").unwrap_or(DEFAULT_MAIL_HOST.to_string());
        let mail_user = Self::required("MAIL_USER")?;
        let mail_pass = Self::required("MAIL_PASS")?;
        let mail_from_name =
            env::var("MAIL_FROM_NAME").unwrap_or(DEFAULT_MAIL_FROM_NAME.to_string());

        let front_url = Self::required("FRONT_URL")?;
        let cors_origin = env::var("CORS_ORIGIN").unwrap_or(DEFAULT_CORS_ORIGIN.to_string());

        Self::validate_secret(&access_secret, "Access token")?;
        Self::validate_secret(&refresh_secret, "Refresh token")?;
        Self::validate_secrets_are_different(&access_secret, &refresh_secret)?;

        Ok(Self {
            host,
            port,
            access_secret,
            refresh_secret,
            supabase_url,
            supabase_key,
            mail_host,
            mail_user,
            mail_pass,
            mail_from_name,
            front_url,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "ServerConfig::default() is not allowed for security reasons")]
    fn test_default_panics() {
        let _ = ServerConfig::default();
    }

    #[test]
    fn test_for_testing_has_distinct_secrets() {
        let config = ServerConfig::for_testing();
        assert_ne!(config.access_secret, config.refresh_secret);
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = ServerConfig::validate_secret("too-short", "Access token");
        assert!(result.is_err());
    }

    #[test]
    fn test_insecure_pattern_rejected() {
        let result = ServerConfig::validate_secret(
            "mysecretkey-padded-out-to-thirty-two-chars!!",
            "Access token",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let result = ServerConfig::validate_secrets_are_different("same", "same");
        assert!(result.is_err());
    }
}
