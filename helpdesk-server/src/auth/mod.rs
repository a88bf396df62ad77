//! Authentication and authorization
//!
//! - [`jwt`]: HS256 access tokens
//! - [`middleware`]: optional bearer authentication for every request
//! - [`extractor`]: `CurrentUser` extractor for protected handlers
//! - [`policy`]: ticket access rules
//! - [`rate_limit`]: fixed-window request throttling

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod policy;
pub mod rate_limit;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::authenticate;
pub use rate_limit::{RateLimiter, rate_limit};

use shared::models::Role;

/// Authenticated caller, derived from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            role: claims.role.parse()?,
            id: claims.sub,
        })
    }
}
