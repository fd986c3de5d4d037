//! Error taxonomy for gateway, transport, and configuration failures.
//!
//! ERROR HANDLING
//! ==============
//! Gateway failures are recovered where they happen: the HTTP status is
//! mapped onto one [`AuthError`] variant, the user-facing message is written
//! into the session, and the same error is handed back to the caller so form
//! code can react without re-deriving the mapping.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

pub const VALIDATION_MESSAGE: &str = "Invalid request. Please check your input.";
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Invalid email or password. Please try again.";
pub const FORBIDDEN_MESSAGE: &str = "Access denied. You do not have permission to perform this action.";
pub const CONFLICT_MESSAGE: &str = "Email already in use. Please use a different email address.";
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";
pub const UNKNOWN_MESSAGE: &str = "An unexpected error occurred. Please try again.";

// =============================================================================
// AUTH ERRORS
// =============================================================================

/// A failed gateway operation, already mapped to its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// HTTP 401: the credential (or the email/password pair) was rejected.
    #[error("{0}")]
    InvalidCredential(String),

    /// HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// HTTP 500.
    #[error("{0}")]
    Server(String),

    /// Any other status, a transport failure, or an undecodable response.
    #[error("{0}")]
    Unknown(String),

    /// A newer session operation committed first; this result was dropped
    /// without touching the session.
    #[error("superseded by a newer session operation")]
    Superseded,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl AuthError {
    /// Map a non-success HTTP response onto the taxonomy.
    ///
    /// A JSON body carrying a non-empty `message` string wins over the fixed
    /// per-status message.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = server_message(body);
        let pick = |fallback: &str| message.clone().unwrap_or_else(|| fallback.to_owned());
        match status {
            400 => Self::Validation(pick(VALIDATION_MESSAGE)),
            401 => Self::InvalidCredential(pick(INVALID_CREDENTIAL_MESSAGE)),
            403 => Self::Forbidden(pick(FORBIDDEN_MESSAGE)),
            409 => Self::Conflict(pick(CONFLICT_MESSAGE)),
            500 => Self::Server(pick(SERVER_MESSAGE)),
            _ => Self::Unknown(pick(UNKNOWN_MESSAGE)),
        }
    }

    /// Transport failures never reach the server, so they all read as generic.
    #[must_use]
    pub fn from_transport(err: &TransportError) -> Self {
        log::debug!("transport failure mapped to generic error: {err}");
        Self::Unknown(UNKNOWN_MESSAGE.to_owned())
    }

    /// The message stored in `Session::error`.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::InvalidCredential(m)
            | Self::Forbidden(m)
            | Self::Conflict(m)
            | Self::Server(m)
            | Self::Unknown(m) => m,
            Self::Superseded => "",
        }
    }

    #[must_use]
    pub fn is_invalid_credential(&self) -> bool {
        matches!(self, Self::InvalidCredential(_))
    }

    #[must_use]
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
}

// =============================================================================
// TRANSPORT ERRORS
// =============================================================================

/// Failure below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// A response body could not be decoded into the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// No network stack in this environment (e.g. server-side rendering).
    #[error("network unavailable in this environment")]
    Unavailable,
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Invalid session configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required value was set but blank.
    #[error("{var} must not be empty")]
    Empty { var: String },

    /// A navigation route is not an absolute path.
    #[error("{var} must start with '/', got '{value}'")]
    InvalidRoute { var: String, value: String },
}

// =============================================================================
// STORAGE ERRORS
// =============================================================================

/// A durable-store write failed. Never surfaced past `TokenPersistence`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage write failed for '{key}': {reason}")]
    Write { key: String, reason: String },
}
