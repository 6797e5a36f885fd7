//! HTTP client for the local llama-server completion API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// One attempt per completion, bounded by this timeout.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Health probes answer fast or not at all.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum LlamaError {
    #[error("completion request timed out")]
    Timeout,

    #[error("llama-server returned status {0}")]
    Status(u16),

    #[error("llama-server unreachable: {0}")]
    Transport(String),

    #[error("malformed completion response: {0}")]
    Response(String),
}

/// Sampling parameters for a single completion call.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    stop: &'a [String],
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

/// Client for the llama-server HTTP API.
#[derive(Clone)]
pub struct LlamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl LlamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Send one completion request and return the trimmed generated text.
    /// No retries; a timeout is reported distinctly from other failures.
    pub async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, LlamaError> {
        let body = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            stop: &params.stop,
        };

        debug!(
            prompt_len = prompt.len(),
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            "sending completion request"
        );

        let resp = self
            .http
            .post(format!("{}/completion", self.base_url))
            .timeout(COMPLETION_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlamaError::Timeout
                } else {
                    LlamaError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LlamaError::Status(status.as_u16()));
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| LlamaError::Response(e.to_string()))?;

        Ok(parsed.content.trim().to_owned())
    }

    /// Probe the health endpoint. Any transport failure or non-2xx counts as
    /// unhealthy.
    pub async fn is_healthy(&self) -> bool {
        self.http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn health_probe_fails_fast_when_nothing_listens() {
        // Port 1 is never a llama-server; connection is refused immediately.
        let client = LlamaClient::new("http://127.0.0.1:1");
        assert!(!client.is_healthy().await);
    }

    #[tokio::test]
    async fn complete_reports_transport_error_when_unreachable() {
        let client = LlamaClient::new("http://127.0.0.1:1");
        let params = CompletionParams {
            max_tokens: 16,
            temperature: 0.0,
            stop: vec![],
        };
        match client.complete("hello", &params).await {
            Err(LlamaError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
