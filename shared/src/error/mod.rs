//! Unified error system for the helpdesk service
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized wire error codes
//! - [`ErrorCategory`]: Classification of errors by taxonomy
//! - [`AppError`]: Rich error type with code, message and offending field
//! - [`ApiResponse`] / [`ErrorBody`]: The `data` / `error` response envelopes
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::validation("String must contain at least 3 character(s)")
//!     .with_field("title");
//! assert_eq!(err.code, ErrorCode::ValidationError);
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.error.field.as_deref(), Some("title"));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorBody, ErrorDetail};
