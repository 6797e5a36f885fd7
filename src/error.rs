//! Unified gateway error type.
//!
//! Every handler returns `Result<T, ApiError>`, which implements
//! [`axum::response::IntoResponse`] so failures are converted to a JSON body
//! with a status code reflecting the category. Nothing inside a handler is
//! allowed to panic across this boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::ai::LlamaError;

/// All failures that can cross a gateway handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request field was empty or missing.
    #[error("no {0} provided")]
    MissingInput(&'static str),

    /// The inference backend health probe failed.
    #[error("inference backend unavailable")]
    BackendUnavailable,

    /// The completion call exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// Schema introspection failed.
    #[error("failed to fetch database schema")]
    SchemaUnavailable(String),

    /// The generated SQL could not be executed. Carries the statement so the
    /// caller can see what was attempted.
    #[error("query execution failed")]
    QueryFailed { sql: String, details: String },

    /// Any other failure, surfaced as its string form.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MissingInput(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            ApiError::BackendUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::SchemaUnavailable(details) => {
                error!(details = %details, "schema introspection failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string(), "details": details })),
                )
                    .into_response()
            }
            ApiError::QueryFailed { sql, details } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string(), "sql": sql, "details": details })),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                error!(message = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

impl From<LlamaError> for ApiError {
    fn from(e: LlamaError) -> Self {
        match e {
            LlamaError::Timeout => ApiError::Timeout,
            LlamaError::Status(code) => ApiError::Internal(format!("server error: {code}")),
            LlamaError::Transport(msg) | LlamaError::Response(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn missing_input_maps_to_400() {
        let resp = ApiError::MissingInput("message").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "no message provided");
    }

    #[tokio::test]
    async fn backend_unavailable_maps_to_503() {
        let resp = ApiError::BackendUnavailable.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn timeout_maps_to_504() {
        let resp = ApiError::Timeout.into_response();
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn query_failed_carries_sql_and_details() {
        let resp = ApiError::QueryFailed {
            sql: "SELECT 1;".into(),
            details: "relation missing".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["sql"], "SELECT 1;");
        assert_eq!(body["details"], "relation missing");
        assert!(body.get("analysis").is_none());
    }

    #[tokio::test]
    async fn schema_unavailable_maps_to_500_with_details() {
        let resp = ApiError::SchemaUnavailable("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["details"], "connection refused");
    }

    #[tokio::test]
    async fn llama_timeout_becomes_api_timeout() {
        let api: ApiError = LlamaError::Timeout.into();
        assert!(matches!(api, ApiError::Timeout));
    }

    #[tokio::test]
    async fn llama_status_becomes_internal() {
        let api: ApiError = LlamaError::Status(502).into();
        assert!(matches!(api, ApiError::Internal(_)));
    }
}
