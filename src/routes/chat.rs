//! Conversational chat endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::ai::{CompletionParams, PromptBuilder, TURN_END};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Forward one user message to the model and return the trimmed reply.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.is_empty() {
        return Err(ApiError::MissingInput("message"));
    }
    if !state.llama.is_healthy().await {
        return Err(ApiError::BackendUnavailable);
    }

    let prompt = PromptBuilder::new().user(&req.message).render();
    let params = CompletionParams {
        max_tokens: 512,
        temperature: 0.7,
        stop: vec![TURN_END.to_owned()],
    };
    let response = state.llama.complete(&prompt, &params).await?;

    Ok(Json(ChatResponse { response }))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::ai::LlamaClient;
    use crate::config::Config;

    fn test_state() -> Arc<AppState> {
        // Port 1 refuses connections immediately, so the health probe fails
        // fast and no completion call is ever attempted.
        Arc::new(AppState {
            config: Arc::new(Config::from_env()),
            llama: LlamaClient::new("http://127.0.0.1:1"),
        })
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_any_backend_call() {
        let result = chat(
            State(test_state()),
            Json(ChatRequest {
                message: String::new(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::MissingInput("message"))));
    }

    #[tokio::test]
    async fn unhealthy_backend_yields_backend_unavailable() {
        let result = chat(
            State(test_state()),
            Json(ChatRequest {
                message: "hello".into(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BackendUnavailable)));
    }
}
