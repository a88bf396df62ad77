//! Server Implementation
//!
//! HTTP listener, background tasks and graceful shutdown

use std::net::SocketAddr;
use std::time::Duration;

use crate::api::create_router;
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::tasks::{BackgroundTasks, spawn_rate_limit_cleanup, spawn_sla_sweeper};

/// HTTP Server
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl-C, then stop background tasks
    pub async fn run(self) -> ServiceResult<()> {
        let mut tasks = BackgroundTasks::new();
        spawn_sla_sweeper(
            &mut tasks,
            self.state.tickets.clone(),
            Duration::from_secs(self.config.sla_sweep_interval_secs),
        );
        spawn_rate_limit_cleanup(&mut tasks, self.state.rate_limiter.clone());
        tracing::info!(count = tasks.len(), "Background tasks started");

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::Db(e.into()))?;
        tracing::info!(%addr, environment = %self.config.environment, "Helpdesk server listening");

        let app = create_router(self.state);
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await;

        tasks.shutdown().await;
        served.map_err(|e| ServiceError::Db(e.into()))
    }
}
