//! Bridges job-store transitions onto the event bus and the history store.
//!
//! The store's transition hook is synchronous; history writes are async.
//! The hook therefore pushes [`TransitionRecord`]s into an unbounded
//! channel consumed by [`HistoryRelay`], a single background task that
//! writes through to the [`HistoryStore`] sequentially. Per-job ordering is
//! preserved because records are sent in application order and consumed by
//! one task. History failures are logged and skipped: the audit trail is
//! redundant and must never affect job processing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use torque_core::{HistoryStore, Job, JobState};

use crate::event::{types, Event};

/// One applied state transition, as reported by the store's hook.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    /// Snapshot of the job after the transition.
    pub job: Job,
    /// Previous state; `None` for the initial transition at submission.
    pub from: Option<JobState>,
    /// Resulting state.
    pub to: JobState,
}

/// Build the bus event for a transition.
///
/// Completions and dead-letters get their own event types; everything else
/// is a plain state change. The payload mirrors the job's wire identity
/// plus the from/to pair (empty string for the initial "from").
pub fn transition_event(record: &TransitionRecord) -> Event {
    let event_type = match record.to {
        JobState::Completed => types::JOB_COMPLETED,
        JobState::Discarded => types::JOB_DEAD,
        _ => types::JOB_STATE_CHANGED,
    };
    Event::new(event_type)
        .for_job(record.job.id.clone(), record.job.queue.clone())
        .with_data(serde_json::json!({
            "job_id": record.job.id,
            "type": record.job.kind,
            "from_state": record.from.map(JobState::as_str).unwrap_or(""),
            "to_state": record.to.as_str(),
            "queue": record.job.queue,
        }))
}

/// Background writer that mirrors every transition into the history store.
pub struct HistoryRelay {
    history: Arc<dyn HistoryStore>,
    rx: mpsc::UnboundedReceiver<TransitionRecord>,
}

impl HistoryRelay {
    /// Create the relay and the sender half its producers use.
    pub fn channel(
        history: Arc<dyn HistoryStore>,
    ) -> (mpsc::UnboundedSender<TransitionRecord>, HistoryRelay) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, HistoryRelay { history, rx })
    }

    /// Consume records until the channel closes or `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("History relay shutting down");
                    break;
                }
                record = self.rx.recv() => {
                    let Some(record) = record else { break };
                    self.write_through(&record).await;
                }
            }
        }
    }

    async fn write_through(&self, record: &TransitionRecord) {
        if let Err(e) = self.history.save_job(&record.job).await {
            tracing::warn!(job_id = %record.job.id, error = %e, "Failed to save job to history");
        }
        if let Some(from) = record.from {
            if let Err(e) = self
                .history
                .update_job_state(&record.job.id, from, record.to, "")
                .await
            {
                tracing::warn!(job_id = %record.job.id, error = %e, "Failed to record state change");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
