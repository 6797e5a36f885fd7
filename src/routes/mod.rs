//! Axum router construction for the gateway and the `dbgate` companion.

mod chat;
pub mod gate;
mod schema;
mod sql;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the complete gateway router.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(chat::router())
        .merge(sql::router())
        .merge(schema::router())
        .layer(cors_layer())
        .with_state(state)
}

pub(crate) fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
