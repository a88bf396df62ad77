//! Shared types for the helpdesk service
//!
//! Wire types and pure domain logic used by the server and its clients:
//! error codes and response envelopes, ticket/comment/event models, the SLA
//! calculator and the comment tree builder. Nothing here performs I/O.

pub mod comment_tree;
pub mod error;
pub mod models;
pub mod sla;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
