//! Submission/administration surface: create, inspect, list, cancel.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use torque_core::{JobFilter, SubmitOptions};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for POST /jobs.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    /// Caller-supplied id; generated when absent.
    pub id: Option<String>,
    /// Job type. Required, non-empty.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Argument payload; defaults to an empty array.
    pub args: Option<serde_json::Value>,
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub options: CreateJobOptions,
}

/// The `options` object of a submission.
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobOptions {
    pub queue: Option<String>,
    pub priority: Option<i32>,
    pub max_attempts: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub tags: Option<Vec<String>>,
}

/// POST /jobs
///
/// Creates a job and returns it with `201 Created` and a `Location` header.
pub async fn create_job(
    State(state): State<AppState>,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let opts = SubmitOptions {
        id: req.id,
        meta: req.meta,
        queue: req.options.queue,
        priority: req.options.priority,
        max_attempts: req.options.max_attempts,
        timeout_ms: req.options.timeout_ms,
        scheduled_at: req.options.scheduled_at,
        tags: req.options.tags,
    };

    let job = state.store.submit(
        req.kind.as_deref().unwrap_or(""),
        req.args.unwrap_or_else(|| json!([])),
        opts,
    )?;

    tracing::info!(job_id = %job.id, job_type = %job.kind, queue = %job.queue, "Job submitted");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/jobs/{}", job.id))],
        Json(json!({ "job": job })),
    ))
}

/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = state.store.get(&id)?;
    Ok(Json(json!({ "job": job })))
}

/// GET /jobs?state=&queue=&limit=
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> AppResult<impl IntoResponse> {
    let jobs = state.store.list_jobs(filter);
    Ok(Json(json!({ "jobs": jobs })))
}

/// DELETE /jobs/{id}
///
/// Cancels the job; `409 Conflict` if its current state forbids it.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = state.store.cancel(&id, &state.shutdown)?;
    tracing::info!(job_id = %job.id, "Job cancelled");
    Ok(Json(json!({ "job": job })))
}
