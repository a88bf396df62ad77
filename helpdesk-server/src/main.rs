use helpdesk_server::error::BoxError;
use helpdesk_server::{AppState, Config, Server, init_logger};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. Environment (.env is optional)
    let _ = dotenvy::dotenv();

    // 2. Configuration
    let config = Config::from_env()?;

    // 3. Logging
    init_logger(config.log_level.as_deref(), config.log_dir.as_deref());
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Helpdesk server starting...");

    // 4. State (opens the database and runs migrations)
    let state = AppState::new(&config).await?;
    state.ensure_bootstrap_admin().await?;

    // 5. Serve
    if let Err(e) = Server::with_state(config, state).run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
