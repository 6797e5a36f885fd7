//! Routes for `dbgate`, the companion service that runs next to the
//! database host and exposes raw query access over HTTP.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::db;

use super::cors_layer;

pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .layer(cors_layer())
        .with_state(config)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// Execute one SQL statement and return all rows. The wire shape carries an
/// explicit success flag rather than relying on the status code alone.
pub async fn query(State(config): State<Arc<Config>>, Json(req): Json<QueryRequest>) -> Response {
    if req.query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no query provided" })),
        )
            .into_response();
    }

    match db::run_query(&config, &req.query).await {
        Ok(output) => Json(json!({
            "success": true,
            "data": output.rows,
            "row_count": output.row_count,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn empty_query_is_a_bad_request() {
        let config = Arc::new(Config::from_env());
        let resp = query(
            State(config),
            Json(QueryRequest {
                query: String::new(),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
