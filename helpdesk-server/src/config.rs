//! Helpdesk server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Helpdesk server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 signing secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub jwt_expiration_minutes: i64,
    /// Requests per client per one-minute window
    pub rate_limit_per_min: u32,
    /// Background SLA sweep period
    pub sla_sweep_interval_secs: u64,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: Option<String>,
    /// Directory for daily-rolling log files
    pub log_dir: Option<String>,
    /// Admin account ensured at startup (email, password)
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(email), Some(password)) => Some((email, password)),
            (Some(_), None) | (None, Some(_)) => {
                return Err(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .into(),
                );
            }
            (None, None) => None,
        };

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "helpdesk.db".into()),
            http_port: Self::parsed("HTTP_PORT", 4000),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiration_minutes: Self::parsed("JWT_EXPIRATION_MINUTES", 720),
            rate_limit_per_min: Self::parsed("RATE_LIMIT_PER_MIN", 60),
            sla_sweep_interval_secs: Self::parsed("SLA_SWEEP_INTERVAL_SECS", 60).max(1),
            log_level: std::env::var("LOG_LEVEL").ok().filter(|s| !s.is_empty()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            environment,
            bootstrap_admin,
        })
    }

    /// Configuration for tests and local tooling: development defaults, given database
    pub fn for_database(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            jwt_expiration_minutes: 720,
            rate_limit_per_min: 60,
            sla_sweep_interval_secs: 60,
            log_level: None,
            log_dir: None,
            bootstrap_admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_development_fallback() {
        let val = Config::require_secret("HELPDESK_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-HELPDESK_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_production_missing() {
        assert!(Config::require_secret("HELPDESK_TEST_UNSET_SECRET", "production").is_err());
    }

    #[test]
    fn test_for_database_defaults() {
        let config = Config::for_database("/tmp/x.db");
        assert_eq!(config.database_path, "/tmp/x.db");
        assert_eq!(config.rate_limit_per_min, 60);
        assert_eq!(config.environment, "development");
    }
}
