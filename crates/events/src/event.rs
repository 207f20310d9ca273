//! The event envelope and subscriber filters.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known event type names.
///
/// The bus itself treats types as opaque strings, so callers are free to
/// publish custom types alongside these.
pub mod types {
    /// A job moved to a new lifecycle state.
    pub const JOB_STATE_CHANGED: &str = "job.state_changed";
    /// A job finished successfully.
    pub const JOB_COMPLETED: &str = "job.completed";
    /// A job attempt failed.
    pub const JOB_FAILED: &str = "job.failed";
    /// A job exhausted its attempts and was dead-lettered.
    pub const JOB_DEAD: &str = "job.dead";
}

/// An immutable record of a single notable occurrence.
///
/// The `id` is assigned by the bus at publish time from a monotonically
/// increasing counter. `job_id` and `queue` exist only for subscriber
/// filtering and are never serialized; an empty string means the event has
/// no such association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Bus-assigned ascending identifier; never reused, never reset.
    pub id: u64,

    /// Dot-separated event name, e.g. `"job.state_changed"`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Free-form JSON payload carrying event-specific data.
    pub data: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,

    /// Correlated job id, filtering only.
    #[serde(skip)]
    pub job_id: String,

    /// Correlated queue name, filtering only.
    #[serde(skip)]
    pub queue: String,
}

impl Event {
    /// Create a new event with only the required type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: 0,
            event_type: event_type.into(),
            data: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
            job_id: String::new(),
            queue: String::new(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Associate the event with a job and its queue, for filtering.
    pub fn for_job(mut self, job_id: impl Into<String>, queue: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self.queue = queue.into();
        self
    }
}

/// What a subscriber wants to see. Constraints are AND-ed; anything left
/// unset matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub queue: Option<String>,
    pub job_id: Option<String>,
    /// Accepted event types; empty accepts all.
    pub types: HashSet<String>,
}

impl EventFilter {
    /// Whether `event` passes this filter.
    ///
    /// Filters only exclude, never require: an event that carries no
    /// queue/job association (empty string) passes queue/job constraints,
    /// so globally-scoped events still reach scoped subscribers.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(queue) = &self.queue {
            if !event.queue.is_empty() && event.queue != *queue {
                return false;
            }
        }
        if let Some(job_id) = &self.job_id {
            if !event.job_id.is_empty() && event.job_id != *job_id {
                return false;
            }
        }
        if !self.types.is_empty() && !self.types.contains(&event.event_type) {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scoped(queue: &str, job_id: &str) -> Event {
        Event::new(types::JOB_STATE_CHANGED).for_job(job_id, queue)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EventFilter::default();
        assert!(filter.matches(&scoped("email", "j1")));
        assert!(filter.matches(&Event::new("custom.thing")));
    }

    #[test]
    fn queue_filter_excludes_other_queues() {
        let filter = EventFilter {
            queue: Some("email".into()),
            ..Default::default()
        };
        assert!(filter.matches(&scoped("email", "j1")));
        assert!(!filter.matches(&scoped("reports", "j1")));
    }

    #[test]
    fn unscoped_events_pass_scoped_filters() {
        let filter = EventFilter {
            queue: Some("email".into()),
            job_id: Some("j1".into()),
            ..Default::default()
        };
        // No queue/job association: filters exclude, never require.
        assert!(filter.matches(&Event::new("custom.global")));
    }

    #[test]
    fn type_filter_is_exact() {
        let filter = EventFilter {
            types: [types::JOB_COMPLETED.to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert!(filter.matches(&Event::new(types::JOB_COMPLETED)));
        assert!(!filter.matches(&Event::new(types::JOB_STATE_CHANGED)));
    }

    #[test]
    fn constraints_are_anded() {
        let filter = EventFilter {
            queue: Some("email".into()),
            types: [types::JOB_COMPLETED.to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert!(filter.matches(&Event::new(types::JOB_COMPLETED).for_job("j1", "email")));
        assert!(!filter.matches(&Event::new(types::JOB_STATE_CHANGED).for_job("j1", "email")));
        assert!(!filter.matches(&Event::new(types::JOB_COMPLETED).for_job("j1", "reports")));
    }

    #[test]
    fn filter_fields_are_not_serialized() {
        let value = serde_json::to_value(scoped("email", "j1")).unwrap();
        assert!(value.get("job_id").is_none());
        assert!(value.get("queue").is_none());
        assert_eq!(value["type"], types::JOB_STATE_CHANGED);
    }
}
