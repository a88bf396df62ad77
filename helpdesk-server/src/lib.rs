//! Helpdesk Server - ticketing core over HTTP
//!
//! # Module structure
//!
//! ```text
//! helpdesk-server/src/
//! ├── api/          # HTTP routes and handlers
//! ├── auth/         # JWT, access policy, rate limiting
//! ├── db/           # SQLite queries (sqlx)
//! ├── tickets/      # Ticket store and detail views
//! ├── idempotency   # Idempotency-Key replay middleware
//! ├── tasks         # Background SLA sweeper and cleanup
//! └── config, state, logger, server
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod idempotency;
pub mod logger;
pub mod server;
pub mod state;
pub mod tasks;
pub mod tickets;
pub mod util;

// Re-export common types
pub use api::create_router;
pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use logger::init_logger;
pub use server::Server;
pub use state::AppState;
pub use tickets::TicketStore;
