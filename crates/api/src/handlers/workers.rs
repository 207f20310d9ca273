//! Worker surface: fetch, ack, nack.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use torque_core::FetchRequest;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for POST /workers/ack.
#[derive(Debug, Deserialize)]
pub struct AckRequest {
    pub job_id: String,
    pub result: Option<serde_json::Value>,
}

/// Request body for POST /workers/nack.
#[derive(Debug, Deserialize)]
pub struct NackRequest {
    pub job_id: String,
    pub error: Option<serde_json::Value>,
    /// Accepted for wire compatibility (`null` included); the engine
    /// decides requeue vs discard from the attempt counter.
    #[allow(dead_code)]
    pub requeue: Option<bool>,
}

/// POST /workers/fetch
///
/// Atomically claims up to `count` jobs across the requested queues. An
/// empty result is a normal `200`, never an error.
pub async fn fetch_jobs(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let worker = req.worker_id.clone();
    let jobs = state.store.fetch(req, &state.shutdown)?;
    if !jobs.is_empty() {
        tracing::debug!(
            count = jobs.len(),
            worker_id = worker.as_deref().unwrap_or(""),
            "Jobs fetched"
        );
    }
    Ok(Json(json!({ "jobs": jobs })))
}

/// POST /workers/ack
pub async fn ack_job(
    State(state): State<AppState>,
    body: Result<Json<AckRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let job = state.store.ack(&req.job_id, req.result, &state.shutdown)?;
    tracing::debug!(job_id = %job.id, "Job acknowledged");
    Ok(Json(json!({ "job": job })))
}

/// POST /workers/nack
pub async fn nack_job(
    State(state): State<AppState>,
    body: Result<Json<NackRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let job = state.store.nack(&req.job_id, req.error, &state.shutdown)?;
    tracing::debug!(job_id = %job.id, state = %job.state, "Job nacked");
    Ok(Json(json!({ "job": job })))
}
