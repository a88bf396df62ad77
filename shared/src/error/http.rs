//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::ValidationError | Self::InvalidStatus | Self::InvalidPriority => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            Self::Unauthorized
            | Self::InvalidAuth
            | Self::InvalidToken
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::Forbidden => StatusCode::FORBIDDEN,

            // 404 Not Found
            Self::NotFound | Self::TicketNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::VersionMismatch | Self::EmailTaken => StatusCode::CONFLICT,

            // 429 Too Many Requests
            Self::RateLimit => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::ValidationError.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidStatus.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::TicketNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VersionMismatch.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::RateLimit.http_status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
