//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::handlers::{AppState, handle_scheduled_events, handle_work_events};

/// Build the Axum router with the two function entry points.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events/work", post(handle_work_events))
        .route("/events/scheduled", post(handle_scheduled_events))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
