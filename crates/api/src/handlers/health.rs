//! Liveness and basic observability.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "stats": state.store.stats(),
        "subscribers": state.bus.subscriber_count(),
    }))
}
