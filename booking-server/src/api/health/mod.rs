//! Health check endpoint

use crate::core::ServerState;
use crate::utils::{AppResponse, ok};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<ServerState>> {
    Router::new().route("/", get(health))
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<AppResponse<serde_json::Value>> {
    ok(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    }))
}
