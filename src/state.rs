//! Shared application state injected into every gateway handler.

use std::sync::Arc;

use crate::ai::LlamaClient;
use crate::config::Config;

/// State shared across all HTTP handlers. Read-only after startup; requests
/// share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llama: LlamaClient,
}
