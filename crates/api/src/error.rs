use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use torque_core::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and implements [`IntoResponse`]
/// to produce the protocol's JSON error envelope:
/// `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the job store.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "not_found", core.to_string())
                }
                // Conflict with the current lifecycle state.
                CoreError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "invalid_request", core.to_string())
                }
                CoreError::Validation(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation_error",
                    core.to_string(),
                ),
                CoreError::Cancelled => {
                    (StatusCode::REQUEST_TIMEOUT, "cancelled", core.to_string())
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
        };

        let body = json!({
            "error": { "code": code, "message": message },
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torque_core::JobState;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (
                CoreError::NotFound { id: "x".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::InvalidTransition {
                    from: JobState::Completed,
                    to: JobState::Cancelled,
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::Validation("missing type".into()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (CoreError::Cancelled.into(), StatusCode::REQUEST_TIMEOUT),
            (
                AppError::BadRequest("bad json".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
