//! dbgate – companion database API.
//!
//! Runs next to the database host and exposes `/health` and `/query` so the
//! gateway (or anything else on the network) can reach the database over
//! HTTP.

use std::sync::Arc;

use tracing::info;

use pgpilot::{init_tracing, routes, shutdown_signal, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env());
    init_tracing(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "dbgate starting");
    info!(
        user = %config.db_user,
        host = %config.db_host,
        port = config.db_port,
        database = %config.db_name,
        "database target"
    );

    let app = routes::gate::router(Arc::clone(&config));
    let listener = tokio::net::TcpListener::bind(&config.gate_bind).await?;
    info!(addr = %config.gate_bind, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("dbgate stopped");
    Ok(())
}
