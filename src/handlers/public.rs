// handlers/public.rs - GET / and GET /health, no authentication

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// GET / - service identity
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": "insure-platform",
            "service": state.service(),
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "storage": state.storage.backend_name(),
        }
    }))
}

/// GET /health - 200 while the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "service": state.service(), "storage": state.storage.backend_name() }
            })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "SERVICE_UNAVAILABLE",
                    "message": "Storage is unreachable"
                })),
            )
        }
    }
}
