//! keygate server: application entry point.

use keygate_server::{AppState, ServerConfig, router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keygate=info".parse()?))
        .json()
        .init();

    info!("Starting keygate server...");

    let config = ServerConfig::from_env()
        .inspect_err(|e| error!(error = %e, "invalid configuration"))?;

    let repo = keygate_db::connect(&config.db).await?;
    let app = router(AppState::new(repo, &config.auth));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("keygate server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install shutdown handler");
    }
}
