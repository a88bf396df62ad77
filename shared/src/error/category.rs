//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category
///
/// Only `System` errors are logged at the response boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or out-of-range input
    Validation,
    /// Missing or invalid credential
    Auth,
    /// Insufficient role or ownership
    Permission,
    /// Resource does not exist
    NotFound,
    /// Concurrent modification or uniqueness clash
    Conflict,
    /// Client should back off
    RateLimit,
    /// Unexpected server-side failure
    System,
}

impl ErrorCode {
    /// Get the category for this error code
    pub const fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::ValidationError | ErrorCode::InvalidStatus | ErrorCode::InvalidPriority => {
                ErrorCategory::Validation
            }
            ErrorCode::Unauthorized
            | ErrorCode::InvalidAuth
            | ErrorCode::InvalidToken
            | ErrorCode::InvalidCredentials => ErrorCategory::Auth,
            ErrorCode::Forbidden => ErrorCategory::Permission,
            ErrorCode::NotFound | ErrorCode::TicketNotFound | ErrorCode::UserNotFound => {
                ErrorCategory::NotFound
            }
            ErrorCode::VersionMismatch | ErrorCode::EmailTaken => ErrorCategory::Conflict,
            ErrorCode::RateLimit => ErrorCategory::RateLimit,
            ErrorCode::InternalError => ErrorCategory::System,
        }
    }

    /// Whether a client may retry the same request after this error
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Conflict | ErrorCategory::RateLimit | ErrorCategory::System
        )
    }
}
