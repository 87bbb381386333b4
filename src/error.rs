use std::error::Error;
use std::fmt;

use warp::http::StatusCode;

/// Domain errors carried through every flow as a tagged kind instead of
/// exception-style control flow. Each kind maps to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // Malformed, missing or duplicate input fields
    InvalidInput(String),

    // Bad credentials, missing/invalid/expired access token
    Unauthenticated(String),

    // Missing/invalid refresh token, insufficient role
    Forbidden(String),

    // Missing target record
    NotFound(String),

    // Downstream service failure (SMTP, token signing)
    Internal(String),

    // Datastore adapter errors
    StoreError(String),

    // Configuration errors
    ConfigError(String),
}

impl AuthError {
    /// HTTP status this error kind renders as
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::StoreError(_) | Self::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message rendered in the JSON error body.
    /// Internal details are logged server-side, never echoed to clients.
    pub fn client_message(&self) -> &str {
        match self {
            Self::InvalidInput(msg)
            | Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg) => msg,
            Self::Internal(_) | Self::StoreError(_) | Self::ConfigError(_) => {
                "Error interno del servidor"
            }
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
            Self::StoreError(msg) => write!(f, "Store error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for AuthError {}

impl warp::reject::Reject for AuthError {}

// Generic result type for the auth backend
pub type Result<T> = std::result::Result<T, AuthError>;
