//! Unified error codes for the cafe ordering system
//!
//! This module defines all error codes used across cafe-server, cafe-client and
//! the device frontends. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / session errors
//! - 2xxx: Permission errors
//! - 4xxx: Order lifecycle errors
//! - 6xxx: Catalog errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// No access token was presented
    TokenMissing = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Access token has expired
    TokenExpired = 1003,
    /// Access token is malformed, forged or revoked
    TokenInvalid = 1004,
    /// Account is deactivated
    AccountInactive = 1005,
    /// Email address has not been verified
    EmailUnverified = 1006,
    /// Staff record referenced by the token no longer exists
    StaffNotFound = 1007,
    /// Refresh token is unknown or revoked
    RefreshInvalid = 1008,
    /// Refresh token has expired
    RefreshExpired = 1009,
    /// Too many failed login attempts from this address
    TooManyAttempts = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Event is not legal from the order's current status
    InvalidTransition = 4002,
    /// Order status changed since it was read (concurrent transition)
    StaleState = 4003,
    /// Order has no line items
    EmptyOrder = 4007,
    /// Line quantity is below 1 or above the allowed maximum
    InvalidQuantity = 4008,
    /// Too many line items in one order
    TooManyItems = 4009,

    // ==================== 6xxx: Catalog ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is currently unavailable
    MenuItemUnavailable = 6003,

    // ==================== 7xxx: Table ====================
    /// Table not found or inactive
    TableNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Whether the client should refresh its access token and retry once
    ///
    /// Every 401 except bad credentials and rate limiting counts.
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ErrorCode::TokenMissing
                | ErrorCode::TokenExpired
                | ErrorCode::TokenInvalid
                | ErrorCode::AccountInactive
                | ErrorCode::StaffNotFound
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::TokenMissing => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::AccountInactive => "Account has been deactivated",
            ErrorCode::EmailUnverified => "Email address not verified",
            ErrorCode::StaffNotFound => "Staff account not found",
            ErrorCode::RefreshInvalid => "Refresh token is invalid",
            ErrorCode::RefreshExpired => "Refresh token has expired",
            ErrorCode::TooManyAttempts => "Too many failed attempts, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Transition not allowed from current status",
            ErrorCode::StaleState => "Order was changed by another device, refresh and retry",
            ErrorCode::EmptyOrder => "Order has no items",
            ErrorCode::InvalidQuantity => "Invalid item quantity",
            ErrorCode::TooManyItems => "Too many items in order",

            // Catalog
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is unavailable",

            // Table
            ErrorCode::TableNotFound => "Table not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::TokenMissing),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountInactive),
            1006 => Ok(ErrorCode::EmailUnverified),
            1007 => Ok(ErrorCode::StaffNotFound),
            1008 => Ok(ErrorCode::RefreshInvalid),
            1009 => Ok(ErrorCode::RefreshExpired),
            1010 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::StaleState),
            4007 => Ok(ErrorCode::EmptyOrder),
            4008 => Ok(ErrorCode::InvalidQuantity),
            4009 => Ok(ErrorCode::TooManyItems),

            // Catalog
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6003 => Ok(ErrorCode::MenuItemUnavailable),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::TokenMissing.code(), 1001);
        assert_eq!(ErrorCode::TooManyAttempts.code(), 1010);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::StaleState.code(), 4003);
        assert_eq!(ErrorCode::MenuItemNotFound.code(), 6001);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_covers_every_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::TokenMissing,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::AccountInactive,
            ErrorCode::EmailUnverified,
            ErrorCode::StaffNotFound,
            ErrorCode::RefreshInvalid,
            ErrorCode::RefreshExpired,
            ErrorCode::TooManyAttempts,
            ErrorCode::PermissionDenied,
            ErrorCode::OrderNotFound,
            ErrorCode::InvalidTransition,
            ErrorCode::StaleState,
            ErrorCode::EmptyOrder,
            ErrorCode::InvalidQuantity,
            ErrorCode::TooManyItems,
            ErrorCode::MenuItemNotFound,
            ErrorCode::MenuItemUnavailable,
            ErrorCode::TableNotFound,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        // retired codes are not accepted from the wire
        for retired in [1, 8, 2003, 9003, 9004, 9005] {
            assert_eq!(ErrorCode::try_from(retired), Err(InvalidErrorCode(retired)));
        }
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::StaleState).unwrap();
        assert_eq!(json, "4003");
        let code: ErrorCode = serde_json::from_str("1003").unwrap();
        assert_eq!(code, ErrorCode::TokenExpired);
        assert!(serde_json::from_str::<ErrorCode>("999").is_err());
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(ErrorCode::TokenExpired.is_auth_failure());
        assert!(ErrorCode::TokenInvalid.is_auth_failure());
        assert!(ErrorCode::TokenMissing.is_auth_failure());
        assert!(!ErrorCode::InvalidCredentials.is_auth_failure());
        assert!(!ErrorCode::TooManyAttempts.is_auth_failure());
        assert!(!ErrorCode::PermissionDenied.is_auth_failure());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
        assert_eq!(
            format!("{}", InvalidErrorCode(999)),
            "invalid error code: 999"
        );
    }
}
