//! Per-request PostgreSQL connections.
//!
//! Every database operation opens its own session and drops it on return.
//! Dropping the [`Client`] ends the spawned connection driver task, which is
//! the release guarantee on every exit path.

use serde::Serialize;
use tokio_postgres::{Client, NoTls};
use tracing::debug;

use crate::config::Config;

use super::DbError;

/// Open one connection to the configured database.
pub async fn connect(config: &Config) -> Result<Client, DbError> {
    let (client, connection) = tokio_postgres::connect(&config.pg_conn_string(), NoTls)
        .await
        .map_err(|e| DbError::Unavailable(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(error = %e, "connection task ended");
        }
    });

    Ok(client)
}

#[derive(Debug, Serialize)]
pub struct DbDiagnostic {
    pub version: String,
    pub database: String,
}

/// Round-trip check used by the `/test-db` endpoint.
pub async fn test_connection(config: &Config) -> Result<DbDiagnostic, DbError> {
    let client = connect(config).await?;
    let row = client
        .query_one("SELECT version(), current_database()", &[])
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

    Ok(DbDiagnostic {
        version: row.get(0),
        database: row.get(1),
    })
}
