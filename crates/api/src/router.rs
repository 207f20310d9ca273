//! Route table for the protocol and streaming surfaces.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::{health, jobs, queues, workers};
use crate::sse;
use crate::state::AppState;

/// Build the full application router.
///
/// Protocol routes get a per-request timeout; the event stream is mounted
/// outside it because the stream is expected to stay open indefinitely.
pub fn router(state: AppState) -> Router {
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(state.config.request_timeout_secs),
    );

    let protocol = Router::new()
        .route("/health", get(health::health))
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job).delete(jobs::cancel_job))
        .route("/workers/fetch", post(workers::fetch_jobs))
        .route("/workers/ack", post(workers::ack_job))
        .route("/workers/nack", post(workers::nack_job))
        .route("/queues", get(queues::list_queues))
        .layer(timeout);

    Router::new()
        .merge(protocol)
        .route("/events", get(sse::event_stream))
        .with_state(state)
}
