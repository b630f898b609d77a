//! Session errors

use crate::auth::JwtError;
use crate::db::StorageError;
use shared::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Too many failed login attempts, try again later")]
    TooManyAttempts,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Email address has not been verified")]
    EmailUnverified,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Staff account not found")]
    StaffNotFound,

    #[error("Refresh token is invalid or revoked")]
    RefreshInvalid,

    #[error("Refresh token has expired")]
    RefreshExpired,

    #[error("Credential processing failed: {0}")]
    Credential(String),

    #[error("Token generation failed: {0}")]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::TooManyAttempts => ErrorCode::TooManyAttempts,
            SessionError::InvalidCredentials => ErrorCode::InvalidCredentials,
            SessionError::AccountInactive => ErrorCode::AccountInactive,
            SessionError::EmailUnverified => ErrorCode::EmailUnverified,
            SessionError::TokenExpired => ErrorCode::TokenExpired,
            SessionError::TokenInvalid(_) => ErrorCode::TokenInvalid,
            SessionError::StaffNotFound => ErrorCode::StaffNotFound,
            SessionError::RefreshInvalid => ErrorCode::RefreshInvalid,
            SessionError::RefreshExpired => ErrorCode::RefreshExpired,
            SessionError::Credential(_) | SessionError::Jwt(_) => ErrorCode::InternalError,
            SessionError::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            // Internal details stay in the logs
            SessionError::Storage(e) => e.into(),
            SessionError::Credential(_) | SessionError::Jwt(_) => {
                tracing::error!(error = %err, "Session operation failed");
                AppError::internal("Authentication service error")
            }
            SessionError::TokenInvalid(_) => AppError::invalid_token("Invalid token"),
            other => AppError::with_message(other.code(), other.to_string()),
        }
    }
}
