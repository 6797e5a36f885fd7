//! Read-only schema and connection-diagnostic endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schema", get(get_schema))
        .route("/test-db", get(test_db))
}

/// Return the current structure of the connected database.
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let snapshot = db::fetch_schema(&state.config)
        .await
        .map_err(|e| ApiError::SchemaUnavailable(e.to_string()))?;
    Ok(Json(json!({ "schema": snapshot })))
}

/// Connection diagnostic: server version and database name on success, the
/// driver error text otherwise. Always 200; the payload carries the outcome.
pub async fn test_db(State(state): State<Arc<AppState>>) -> Json<Value> {
    match db::test_connection(&state.config).await {
        Ok(diag) => Json(json!({
            "connected": true,
            "version": diag.version,
            "database": diag.database,
        })),
        Err(e) => Json(json!({
            "connected": false,
            "error": e.to_string(),
        })),
    }
}
