//! Write-through contract for an external job-history store.
//!
//! The engine notifies the history store on every transition and never
//! reads back from it; persistence failures are non-fatal and must be
//! handled by the caller as log-and-continue.

use async_trait::async_trait;

use crate::job::Job;
use crate::state::JobState;

/// Errors surfaced by a history backend. Callers log these and move on.
#[derive(Debug, thiserror::Error)]
#[error("History store error: {0}")]
pub struct HistoryError(pub String);

/// Durable audit trail for job records and their state changes.
///
/// Implementations live outside this crate (database-backed, remote, ...);
/// [`MemoryHistory`] ships for wiring and tests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Upsert the latest snapshot of a job.
    async fn save_job(&self, job: &Job) -> Result<(), HistoryError>;

    /// Append one state change to a job's transition history.
    async fn update_job_state(
        &self,
        job_id: &str,
        from: JobState,
        to: JobState,
        reason: &str,
    ) -> Result<(), HistoryError>;
}

/// A recorded state change, as kept by [`MemoryHistory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub from: JobState,
    pub to: JobState,
    pub reason: String,
}

/// In-process history store backed by plain maps.
#[derive(Default)]
pub struct MemoryHistory {
    inner: std::sync::Mutex<MemoryHistoryInner>,
}

#[derive(Default)]
struct MemoryHistoryInner {
    jobs: std::collections::HashMap<String, Job>,
    changes: std::collections::HashMap<String, Vec<StateChange>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest saved snapshot for a job, if any.
    pub fn job(&self, id: &str) -> Option<Job> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .jobs
            .get(id)
            .cloned()
    }

    /// Recorded state changes for a job, oldest first.
    pub fn changes(&self, id: &str) -> Vec<StateChange> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .changes
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn save_job(&self, job: &Job) -> Result<(), HistoryError> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .jobs
            .insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn update_job_state(
        &self,
        job_id: &str,
        from: JobState,
        to: JobState,
        reason: &str,
    ) -> Result<(), HistoryError> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .changes
            .entry(job_id.to_string())
            .or_default()
            .push(StateChange {
                from,
                to,
                reason: reason.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::SubmitOptions;
    use crate::store::JobStore;

    #[tokio::test]
    async fn memory_history_records_snapshots_and_changes() {
        let store = JobStore::new();
        let job = store
            .submit("t", serde_json::json!([]), SubmitOptions::default())
            .unwrap();

        let history = MemoryHistory::new();
        history.save_job(&job).await.unwrap();
        history
            .update_job_state(&job.id, JobState::Available, JobState::Active, "")
            .await
            .unwrap();

        assert_eq!(history.job(&job.id).unwrap().id, job.id);
        assert_eq!(
            history.changes(&job.id),
            vec![StateChange {
                from: JobState::Available,
                to: JobState::Active,
                reason: String::new(),
            }]
        );
    }
}
