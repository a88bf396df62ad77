//! Application state

use shared::models::{Role, user::normalize_email};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::{JwtConfig, JwtService, RateLimiter};
use crate::config::Config;
use crate::db::{self, DbService};
use crate::error::{ServiceError, ServiceResult};
use crate::tickets::TicketStore;
use crate::util::{hash_password, new_id, now_millis};

const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Ticket store over the same pool
    pub tickets: TicketStore,
    /// Access token service
    pub jwt: Arc<JwtService>,
    /// Per-client request throttling
    pub rate_limiter: RateLimiter,
    pub config: Arc<Config>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Open the database and build the state
    pub async fn new(config: &Config) -> ServiceResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::with_pool(db.pool, config))
    }

    /// Build the state over an existing pool
    pub fn with_pool(pool: SqlitePool, config: &Config) -> Self {
        let jwt = JwtService::with_config(JwtConfig::new(
            config.jwt_secret.clone(),
            config.jwt_expiration_minutes,
        ));

        Self {
            tickets: TicketStore::new(pool.clone()),
            pool,
            jwt: Arc::new(jwt),
            rate_limiter: RateLimiter::new(config.rate_limit_per_min),
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        }
    }

    /// Make sure the configured bootstrap account exists with the admin role
    pub async fn ensure_bootstrap_admin(&self) -> ServiceResult<()> {
        let Some((email, password)) = &self.config.bootstrap_admin else {
            return Ok(());
        };
        let email = normalize_email(email);
        let now = now_millis();

        match db::users::find_by_email(&self.pool, &email).await? {
            Some(user) if user.role == Role::Admin => {
                tracing::debug!(email = %email, "Bootstrap admin already present");
            }
            Some(user) => {
                db::users::update_role(&self.pool, &user.id, Role::Admin, now).await?;
                tracing::info!(email = %email, "Promoted bootstrap account to admin");
            }
            None => {
                let hash = hash_password(password)
                    .map_err(|e| ServiceError::Db(format!("password hashing failed: {e}").into()))?;
                db::users::create(
                    &self.pool,
                    &new_id(),
                    &email,
                    BOOTSTRAP_ADMIN_NAME,
                    Role::Admin,
                    &hash,
                    now,
                )
                .await?;
                tracing::info!(email = %email, "Created bootstrap admin account");
            }
        }
        Ok(())
    }
}
