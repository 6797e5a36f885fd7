//! pgpilot gateway – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing.
//! 3. Launch the llama-server subprocess and wait for it to become healthy;
//!    a failed launch leaves the gateway in degraded mode.
//! 4. Build the Axum router and serve with graceful shutdown.
//! 5. Stop the llama-server subprocess on the way out.

use std::sync::Arc;

use tracing::{info, warn};

use pgpilot::ai::{LlamaClient, LlamaServer};
use pgpilot::state::AppState;
use pgpilot::{init_tracing, routes, shutdown_signal, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env());
    init_tracing(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "pgpilot starting");
    info!(
        user = %config.db_user,
        host = %config.db_host,
        port = config.db_port,
        database = %config.db_name,
        "database target"
    );

    let llama = LlamaClient::new(config.llama_base_url());

    let mut llama_server = LlamaServer::start(&config, &llama).await;
    if llama_server.is_none() {
        warn!("llama-server is not running; inference endpoints will return 503");
    }

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        llama,
    });

    let app = routes::build(state);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(addr = %config.bind, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(server) = llama_server.as_mut() {
        server.stop().await;
    }

    info!("pgpilot stopped");
    Ok(())
}
