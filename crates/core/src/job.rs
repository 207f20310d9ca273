//! The job record and submission options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::JobState;

/// Default queue for jobs submitted without an explicit queue.
pub const DEFAULT_QUEUE: &str = "default";

/// Default number of attempts before a job is discarded.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A single unit of work tracked by the store.
///
/// The store owns the canonical record; callers (workers, HTTP handlers)
/// always receive clones, so nothing outside the lifecycle protocol can
/// mutate a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque, globally unique identifier (UUIDv7 when store-generated).
    pub id: String,

    /// Free-form job type; opaque to the engine.
    #[serde(rename = "type")]
    pub kind: String,

    /// Current lifecycle state.
    pub state: JobState,

    /// Name of the queue this job belongs to.
    pub queue: String,

    /// Argument payload. Never interpreted by the engine.
    pub args: serde_json::Value,

    /// Optional metadata blob, equally opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,

    /// Higher priority is dispatched first; ties keep insertion order.
    pub priority: i32,

    /// Number of times the job has been dispatched.
    pub attempt: u32,

    /// Attempts allowed before a nack discards the job.
    pub max_attempts: u32,

    /// Advisory execution timeout; the engine does not enforce it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enqueued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Result payload recorded on successful completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error payload recorded on a negative acknowledgement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,

    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Optional knobs accepted at submission time.
///
/// Every field has a documented default: queue `"default"`, priority `0`,
/// max attempts `3`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitOptions {
    /// Caller-supplied identifier; a UUIDv7 is generated when absent.
    pub id: Option<String>,
    /// Opaque metadata stored alongside the job.
    pub meta: Option<serde_json::Value>,
    pub queue: Option<String>,
    pub priority: Option<i32>,
    pub max_attempts: Option<u32>,
    pub timeout_ms: Option<u64>,
    /// When set, the job starts in `scheduled` instead of `available` and
    /// is not placed in a dispatch queue.
    pub scheduled_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Job {
        Job {
            id: "0192aa00-0000-7000-8000-000000000001".into(),
            kind: "email.send".into(),
            state: JobState::Available,
            queue: DEFAULT_QUEUE.into(),
            args: serde_json::json!(["to@example.com"]),
            meta: None,
            priority: 0,
            attempt: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_ms: None,
            created_at: Utc::now(),
            enqueued_at: Some(Utc::now()),
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            scheduled_at: None,
            result: None,
            error: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn kind_serializes_as_type() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "email.send");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let value = serde_json::to_value(sample()).unwrap();
        for field in ["meta", "started_at", "completed_at", "result", "error", "tags"] {
            assert!(value.get(field).is_none(), "{field} should be omitted");
        }
    }
}
