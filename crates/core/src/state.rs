//! Job lifecycle states and the transition policy.
//!
//! The transition table is a pure lookup with no side effects so it can be
//! tested independently of the store that consults it.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a job.
///
/// `completed`, `cancelled`, and `discarded` are terminal: no transition
/// leads out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Sitting in a queue, eligible to be returned by a fetch.
    Available,
    /// Waiting for a future `scheduled_at`; not in any dispatch queue.
    Scheduled,
    /// Parked awaiting an external condition; not in any dispatch queue.
    Pending,
    /// Claimed by a worker and currently executing.
    Active,
    /// Failed but still has attempts left; immediately requeued.
    Retryable,
    /// Finished successfully.
    Completed,
    /// Cancelled before completion.
    Cancelled,
    /// Exhausted its attempts (dead-lettered).
    Discarded,
}

impl JobState {
    /// Whether moving from `self` to `to` is an allowed transition.
    ///
    /// Any pair not listed in the table is denied, including self-loops.
    pub fn can_transition_to(self, to: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, to),
            (Available, Active)
                | (Available, Cancelled)
                | (Scheduled, Available)
                | (Scheduled, Cancelled)
                | (Pending, Available)
                | (Pending, Cancelled)
                | (Active, Completed)
                | (Active, Retryable)
                | (Active, Discarded)
                | (Active, Cancelled)
                | (Retryable, Available)
                | (Retryable, Cancelled)
        )
    }

    /// Whether this state has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Discarded
        )
    }

    /// The lowercase wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Available => "available",
            JobState::Scheduled => "scheduled",
            JobState::Pending => "pending",
            JobState::Active => "active",
            JobState::Retryable => "retryable",
            JobState::Completed => "completed",
            JobState::Cancelled => "cancelled",
            JobState::Discarded => "discarded",
        }
    }

    /// All states, for exhaustive table checks.
    pub const ALL: [JobState; 8] = [
        JobState::Available,
        JobState::Scheduled,
        JobState::Pending,
        JobState::Active,
        JobState::Retryable,
        JobState::Completed,
        JobState::Cancelled,
        JobState::Discarded,
    ];
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
