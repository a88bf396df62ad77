//! Unified error codes for the helpdesk service
//!
//! Codes are serialized as SCREAMING_SNAKE_CASE strings so clients can match
//! on them directly (`"VERSION_MISMATCH"`, `"TICKET_NOT_FOUND"`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ==================== Validation ====================
    /// Malformed or out-of-range input
    ValidationError,
    /// Status value outside the ticket status set
    InvalidStatus,
    /// Priority value outside the ticket priority set
    InvalidPriority,

    // ==================== Auth ====================
    /// Request carries no credential
    Unauthorized,
    /// Authorization header is not a bearer credential
    InvalidAuth,
    /// Bearer token failed verification or has expired
    InvalidToken,
    /// Email/password pair does not match
    InvalidCredentials,

    // ==================== Permission ====================
    /// Role or ownership check failed
    Forbidden,

    // ==================== Not found ====================
    /// Route not found
    NotFound,
    /// Ticket does not exist
    TicketNotFound,
    /// User does not exist
    UserNotFound,

    // ==================== Conflict ====================
    /// Optimistic version check failed
    VersionMismatch,
    /// Email already registered
    EmailTaken,

    // ==================== Throttling ====================
    /// Too many requests in the current window
    RateLimit,

    // ==================== System ====================
    /// Unexpected server-side failure
    InternalError,
}

impl ErrorCode {
    /// Wire representation of the code
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::InvalidPriority => "INVALID_PRIORITY",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidAuth => "INVALID_AUTH",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::TicketNotFound => "TICKET_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::VersionMismatch => "VERSION_MISMATCH",
            ErrorCode::EmailTaken => "EMAIL_TAKEN",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::InvalidStatus => "Invalid status value",
            ErrorCode::InvalidPriority => "Invalid priority value",
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidAuth => "Invalid authorization header format",
            ErrorCode::InvalidToken => "Token is invalid or expired",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::Forbidden => "Insufficient permissions",
            ErrorCode::NotFound => "Route not found",
            ErrorCode::TicketNotFound => "Ticket not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::VersionMismatch => "Ticket has been modified by another process",
            ErrorCode::EmailTaken => "Email already registered",
            ErrorCode::RateLimit => "Rate limit exceeded",
            ErrorCode::InternalError => "Unexpected server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown code string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub String);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl FromStr for ErrorCode {
    type Err = InvalidErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| InvalidErrorCode(s.to_string()))
    }
}
