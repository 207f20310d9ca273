//! Queue listing.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /queues
///
/// Every queue that has ever had a job assigned to it, with its current
/// dispatchable depth.
pub async fn list_queues(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(json!({ "queues": state.store.list_queues() })))
}
