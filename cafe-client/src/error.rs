//! Client error types

use std::collections::HashMap;

use serde_json::Value;
use shared::ErrorCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error envelope
    #[error("API error {status} ({}): {message}", .code.map(|c| c.code()).unwrap_or_default())]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
        details: Option<HashMap<String, Value>>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No stored session; log in first
    #[error("Not logged in")]
    NotLoggedIn,

    /// Refresh failed; the stored session was discarded
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Order placement attempted without a granted geofence gate
    #[error("Location check required before ordering")]
    AdmissionRequired,

    /// Session persistence failed
    #[error("Session store error: {0}")]
    Store(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Error code carried by an API error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => *code,
            _ => None,
        }
    }

    /// Authentication failure that a refresh may recover from
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ClientError::Api { code: Some(code), .. } => code.is_auth_failure(),
            ClientError::Api { status, code: None, .. } => *status == 401,
            _ => false,
        }
    }

    /// The order changed on another device; refetch before retrying
    pub fn is_stale_state(&self) -> bool {
        self.code() == Some(ErrorCode::StaleState)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
