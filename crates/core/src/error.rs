use crate::state::JobState;

/// Domain errors surfaced by the job store.
///
/// Every mutating operation is atomic: when one of these is returned, no
/// partial state change is observable.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Job not found: {id}")]
    NotFound { id: String },

    /// The state machine rejected the requested move.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller's cancellation token fired before the operation entered
    /// its critical section.
    #[error("Operation cancelled before it could begin")]
    Cancelled,
}
