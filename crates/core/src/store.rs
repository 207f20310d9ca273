//! In-memory job store: the owner of all job records and dispatch queues.
//!
//! All lifecycle operations are linearizable with respect to each other on a
//! given job/queue: a single `RwLock` guards the job map and the per-queue
//! dispatch lists, and every mutation of a job record and its queue
//! membership happens inside one critical section. Transition notifications
//! are delivered through the registered hook strictly *after* the lock is
//! released, in the order the transitions were applied.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::job::{Job, SubmitOptions, DEFAULT_MAX_ATTEMPTS, DEFAULT_QUEUE};
use crate::state::JobState;

/// Callback invoked once per applied state transition.
///
/// Receives a snapshot of the job *after* the transition, the previous state
/// (`None` for the initial transition at submission), and the resulting
/// state. Called outside the store's lock.
pub type TransitionHook = Box<dyn Fn(&Job, Option<JobState>, JobState) + Send + Sync>;

/// Worker fetch request: which queues to drain, and how many jobs at most.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchRequest {
    /// Queue names, processed in the given order. Defaults to `["default"]`.
    #[serde(default)]
    pub queues: Vec<String>,
    /// Maximum number of jobs to return; zero (the default) means 1.
    #[serde(default)]
    pub count: usize,
    /// Optional identity of the fetching worker, for logging only.
    #[serde(default)]
    pub worker_id: Option<String>,
}

/// Filter for [`JobStore::list_jobs`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub state: Option<JobState>,
    pub queue: Option<String>,
    pub limit: Option<usize>,
}

/// One entry of [`JobStore::list_queues`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueInfo {
    pub name: String,
    /// Current dispatchable depth.
    pub available: usize,
}

/// Point-in-time counters, for health/observability endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub queue_depths: HashMap<String, usize>,
}

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<String, Job>,
    /// Queue name -> ids of `available` jobs, descending priority, stable
    /// insertion order as the tie-break. A job id appears in at most one
    /// queue list, and only while the job is `available`.
    queues: HashMap<String, Vec<String>>,
}

impl StoreInner {
    /// Insert a job id into its queue, keeping descending-priority order.
    /// Equal priorities keep insertion order.
    fn enqueue(&mut self, id: &str, queue: &str, priority: i32) {
        let jobs = &self.jobs;
        let list = self.queues.entry(queue.to_string()).or_default();
        let pos = list
            .iter()
            .position(|other| jobs.get(other).is_none_or(|j| j.priority < priority))
            .unwrap_or(list.len());
        list.insert(pos, id.to_string());
    }

    /// Remove a job id from its queue list, if present.
    fn dequeue(&mut self, id: &str, queue: &str) {
        if let Some(list) = self.queues.get_mut(queue) {
            list.retain(|j| j != id);
        }
    }
}

/// A pending notification, recorded under the lock and delivered after it.
struct Transition {
    job: Job,
    from: Option<JobState>,
    to: JobState,
}

/// The in-memory job store.
///
/// Cheap to share via `Arc`; all methods take `&self`.
pub struct JobStore {
    inner: RwLock<StoreInner>,
    on_transition: Option<TransitionHook>,
}

impl JobStore {
    /// Create a store with no transition hook.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            on_transition: None,
        }
    }

    /// Create a store that reports every state transition to `hook`.
    pub fn with_hook(hook: TransitionHook) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            on_transition: Some(hook),
        }
    }

    // -- lock helpers -------------------------------------------------------

    // Our critical sections never panic, so a poisoned lock only means a
    // panic elsewhere in the holder's thread; the data is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver recorded transitions, in application order. Must be called
    /// with the lock released.
    fn notify(&self, batch: Vec<Transition>) {
        if let Some(hook) = &self.on_transition {
            for t in &batch {
                hook(&t.job, t.from, t.to);
            }
        }
    }

    // -- operations ---------------------------------------------------------

    /// Create and enqueue a new job.
    ///
    /// With `scheduled_at` set the job starts in `scheduled` and is not
    /// placed in a dispatch queue; otherwise it starts `available`. Emits a
    /// transition event with an empty "from" state.
    pub fn submit(
        &self,
        kind: &str,
        args: serde_json::Value,
        opts: SubmitOptions,
    ) -> Result<Job, CoreError> {
        if kind.is_empty() {
            return Err(CoreError::Validation("Field 'type' is required".into()));
        }

        let id = match opts.id {
            Some(id) if !id.is_empty() => id,
            _ => uuid::Uuid::now_v7().to_string(),
        };

        let now = Utc::now();
        let scheduled = opts.scheduled_at.is_some();
        let job = Job {
            id,
            kind: kind.to_string(),
            state: if scheduled {
                JobState::Scheduled
            } else {
                JobState::Available
            },
            queue: opts.queue.unwrap_or_else(|| DEFAULT_QUEUE.to_string()),
            args,
            meta: opts.meta,
            priority: opts.priority.unwrap_or(0),
            attempt: 0,
            max_attempts: opts.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            timeout_ms: opts.timeout_ms,
            created_at: now,
            enqueued_at: (!scheduled).then_some(now),
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            scheduled_at: opts.scheduled_at,
            result: None,
            error: None,
            tags: opts.tags.unwrap_or_default(),
        };

        let snapshot = {
            let mut inner = self.write();
            if inner.jobs.contains_key(&job.id) {
                return Err(CoreError::Validation(format!(
                    "Job id already exists: {}",
                    job.id
                )));
            }
            if job.state == JobState::Available {
                inner.enqueue(&job.id, &job.queue, job.priority);
            }
            inner.jobs.insert(job.id.clone(), job.clone());
            job
        };

        let to = snapshot.state;
        self.notify(vec![Transition {
            job: snapshot.clone(),
            from: None,
            to,
        }]);
        Ok(snapshot)
    }

    /// Look up a job by id.
    pub fn get(&self, id: &str) -> Result<Job, CoreError> {
        self.read()
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    /// Cancel a job, removing it from its dispatch queue if present.
    pub fn cancel(&self, id: &str, cancel: &CancellationToken) -> Result<Job, CoreError> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let (snapshot, from) = {
            let mut inner = self.write();
            let job = inner
                .jobs
                .get(id)
                .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;

            let from = job.state;
            if !from.can_transition_to(JobState::Cancelled) {
                return Err(CoreError::InvalidTransition {
                    from,
                    to: JobState::Cancelled,
                });
            }

            let queue = job.queue.clone();
            inner.dequeue(id, &queue);
            let job = inner
                .jobs
                .get_mut(id)
                .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
            job.state = JobState::Cancelled;
            job.cancelled_at = Some(Utc::now());
            (job.clone(), from)
        };

        self.notify(vec![Transition {
            job: snapshot.clone(),
            from: Some(from),
            to: JobState::Cancelled,
        }]);
        Ok(snapshot)
    }

    /// Atomically claim up to `count` jobs across the requested queues.
    ///
    /// Queues are drained in caller-supplied order, head of list first.
    /// Each claimed job moves `available -> active`, gets a start timestamp,
    /// and has its attempt counter incremented. An empty result is not an
    /// error. Safe against concurrent fetchers: the whole pop-and-transition
    /// sequence runs under one write lock, so no job can be returned twice.
    pub fn fetch(
        &self,
        req: FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Job>, CoreError> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let queues = if req.queues.is_empty() {
            vec![DEFAULT_QUEUE.to_string()]
        } else {
            req.queues
        };
        let count = req.count.max(1);

        let mut batch = Vec::new();
        {
            let mut inner = self.write();
            for queue in &queues {
                if batch.len() >= count {
                    break;
                }
                let remaining = count - batch.len();
                let taken: Vec<String> = match inner.queues.get_mut(queue) {
                    Some(list) => list.drain(..remaining.min(list.len())).collect(),
                    None => continue,
                };
                let now = Utc::now();
                for id in taken {
                    // The queue list only holds ids of available jobs.
                    if let Some(job) = inner.jobs.get_mut(&id) {
                        let from = job.state;
                        job.state = JobState::Active;
                        job.started_at = Some(now);
                        job.attempt += 1;
                        batch.push(Transition {
                            job: job.clone(),
                            from: Some(from),
                            to: JobState::Active,
                        });
                    }
                }
            }
        }

        let fetched: Vec<Job> = batch.iter().map(|t| t.job.clone()).collect();
        self.notify(batch);
        Ok(fetched)
    }

    /// Acknowledge successful completion of a job.
    pub fn ack(
        &self,
        id: &str,
        result: Option<serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<Job, CoreError> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let (snapshot, from) = {
            let mut inner = self.write();
            let job = inner
                .jobs
                .get_mut(id)
                .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;

            let from = job.state;
            if !from.can_transition_to(JobState::Completed) {
                return Err(CoreError::InvalidTransition {
                    from,
                    to: JobState::Completed,
                });
            }

            job.state = JobState::Completed;
            job.completed_at = Some(Utc::now());
            if result.is_some() {
                job.result = result;
            }
            (job.clone(), from)
        };

        self.notify(vec![Transition {
            job: snapshot.clone(),
            from: Some(from),
            to: JobState::Completed,
        }]);
        Ok(snapshot)
    }

    /// Negatively acknowledge a job.
    ///
    /// With attempts left the job becomes `retryable`, which immediately
    /// collapses back to `available` and re-enters its queue; the single
    /// emitted event reports the final resulting state. With attempts
    /// exhausted (`attempt >= max_attempts`) the job is `discarded`.
    pub fn nack(
        &self,
        id: &str,
        error: Option<serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<Job, CoreError> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let (snapshot, from, to) = {
            let mut inner = self.write();
            let job = inner
                .jobs
                .get_mut(id)
                .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;

            let from = job.state;
            let target = if job.attempt >= job.max_attempts {
                JobState::Discarded
            } else {
                JobState::Retryable
            };
            if !from.can_transition_to(target) {
                return Err(CoreError::InvalidTransition { from, to: target });
            }

            if error.is_some() {
                job.error = error;
            }

            let to = if target == JobState::Retryable {
                // Transient label: resolve straight back to available.
                job.state = JobState::Available;
                let (id, queue, priority) = (job.id.clone(), job.queue.clone(), job.priority);
                inner.enqueue(&id, &queue, priority);
                JobState::Available
            } else {
                job.state = JobState::Discarded;
                JobState::Discarded
            };

            // Re-borrow for the snapshot; `enqueue` needed `inner` above.
            let job = inner
                .jobs
                .get(id)
                .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
            (job.clone(), from, to)
        };

        self.notify(vec![Transition {
            job: snapshot.clone(),
            from: Some(from),
            to,
        }]);
        Ok(snapshot)
    }

    /// Every queue that has ever had a job assigned to it, with its current
    /// dispatchable depth, sorted by name.
    pub fn list_queues(&self) -> Vec<QueueInfo> {
        let inner = self.read();
        let mut depths: BTreeMap<&str, usize> = BTreeMap::new();
        for (name, list) in &inner.queues {
            depths.insert(name, list.len());
        }
        // Queues that only ever held scheduled (or otherwise never-enqueued)
        // jobs have no entry in the queues map yet.
        for job in inner.jobs.values() {
            depths.entry(&job.queue).or_insert(0);
        }
        depths
            .into_iter()
            .map(|(name, available)| QueueInfo {
                name: name.to_string(),
                available,
            })
            .collect()
    }

    /// List jobs matching the filter, newest first.
    pub fn list_jobs(&self, filter: JobFilter) -> Vec<Job> {
        let inner = self.read();
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|j| filter.state.is_none_or(|s| j.state == s))
            .filter(|j| filter.queue.as_deref().is_none_or(|q| j.queue == q))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            jobs.truncate(limit);
        }
        jobs
    }

    /// Point-in-time counters.
    pub fn stats(&self) -> StoreStats {
        let inner = self.read();
        StoreStats {
            total_jobs: inner.jobs.len(),
            active_jobs: inner
                .jobs
                .values()
                .filter(|j| j.state == JobState::Active)
                .count(),
            queue_depths: inner
                .queues
                .iter()
                .map(|(name, list)| (name.clone(), list.len()))
                .collect(),
        }
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::{Arc, Mutex};

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    fn submit_simple(store: &JobStore, queue: &str, priority: i32) -> Job {
        store
            .submit(
                "test.job",
                serde_json::json!([]),
                SubmitOptions {
                    queue: Some(queue.into()),
                    priority: Some(priority),
                    ..Default::default()
                },
            )
            .expect("submit")
    }

    fn fetch_one(store: &JobStore, queue: &str) -> Option<Job> {
        store
            .fetch(
                FetchRequest {
                    queues: vec![queue.into()],
                    count: 1,
                    worker_id: None,
                },
                &token(),
            )
            .expect("fetch")
            .into_iter()
            .next()
    }

    #[test]
    fn submit_applies_defaults() {
        let store = JobStore::new();
        let job = store
            .submit("email.send", serde_json::json!(["a"]), SubmitOptions::default())
            .unwrap();
        assert_eq!(job.state, JobState::Available);
        assert_eq!(job.queue, "default");
        assert_eq!(job.priority, 0);
        assert_eq!(job.attempt, 0);
        assert_eq!(job.max_attempts, 3);
        assert!(job.enqueued_at.is_some());
    }

    #[test]
    fn submit_rejects_empty_type() {
        let store = JobStore::new();
        let err = store
            .submit("", serde_json::json!([]), SubmitOptions::default())
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn submit_rejects_duplicate_id() {
        let store = JobStore::new();
        let opts = SubmitOptions {
            id: Some("job-1".into()),
            ..Default::default()
        };
        store
            .submit("a", serde_json::json!([]), opts.clone())
            .unwrap();
        let err = store.submit("b", serde_json::json!([]), opts).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn scheduled_job_is_not_dispatchable() {
        let store = JobStore::new();
        let job = store
            .submit(
                "report.nightly",
                serde_json::json!([]),
                SubmitOptions {
                    queue: Some("reports".into()),
                    scheduled_at: Some(Utc::now() + chrono::Duration::hours(1)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(job.state, JobState::Scheduled);
        assert!(job.enqueued_at.is_none());
        assert!(fetch_one(&store, "reports").is_none());
        // But the queue still shows up in the listing.
        assert_eq!(
            store.list_queues(),
            vec![QueueInfo {
                name: "reports".into(),
                available: 0
            }]
        );
    }

    #[test]
    fn get_unknown_job_is_not_found() {
        let store = JobStore::new();
        assert_matches!(store.get("nope"), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn fetch_respects_priority_order() {
        let store = JobStore::new();
        let low = submit_simple(&store, "default", 1);
        let high = submit_simple(&store, "default", 10);
        let mid = submit_simple(&store, "default", 5);

        let fetched = store
            .fetch(
                FetchRequest {
                    queues: vec!["default".into()],
                    count: 3,
                    worker_id: None,
                },
                &token(),
            )
            .unwrap();
        let ids: Vec<&str> = fetched.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec![high.id.as_str(), mid.id.as_str(), low.id.as_str()]);
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let store = JobStore::new();
        let first = submit_simple(&store, "default", 0);
        let second = submit_simple(&store, "default", 0);
        assert_eq!(fetch_one(&store, "default").unwrap().id, first.id);
        assert_eq!(fetch_one(&store, "default").unwrap().id, second.id);
    }

    #[test]
    fn fetch_walks_queues_in_caller_order() {
        let store = JobStore::new();
        let b = submit_simple(&store, "beta", 100);
        let a = submit_simple(&store, "alpha", 0);

        let fetched = store
            .fetch(
                FetchRequest {
                    queues: vec!["alpha".into(), "beta".into()],
                    count: 2,
                    worker_id: None,
                },
                &token(),
            )
            .unwrap();
        let ids: Vec<&str> = fetched.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
    }

    #[test]
    fn fetch_marks_jobs_active_and_counts_attempts() {
        let store = JobStore::new();
        submit_simple(&store, "default", 0);
        let job = fetch_one(&store, "default").unwrap();
        assert_eq!(job.state, JobState::Active);
        assert_eq!(job.attempt, 1);
        assert!(job.started_at.is_some());
    }

    #[test]
    fn fetch_from_empty_queue_is_not_an_error() {
        let store = JobStore::new();
        let fetched = store.fetch(FetchRequest::default(), &token()).unwrap();
        assert!(fetched.is_empty());
    }

    #[test]
    fn concurrent_fetchers_never_share_a_job() {
        const JOBS: usize = 8;
        const FETCHERS: usize = 24;

        let store = Arc::new(JobStore::new());
        for _ in 0..JOBS {
            submit_simple(&store, "default", 0);
        }

        let mut handles = Vec::new();
        for _ in 0..FETCHERS {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || fetch_one(&store, "default")));
        }

        let mut claimed: Vec<String> = handles
            .into_iter()
            .filter_map(|h| h.join().expect("fetcher thread"))
            .map(|j| j.id)
            .collect();
        claimed.sort();
        let before = claimed.len();
        claimed.dedup();
        assert_eq!(claimed.len(), before, "a job was fetched twice");
        assert_eq!(claimed.len(), JOBS);
    }

    #[test]
    fn ack_completes_an_active_job() {
        let store = JobStore::new();
        submit_simple(&store, "default", 0);
        let job = fetch_one(&store, "default").unwrap();
        let done = store
            .ack(&job.id, Some(serde_json::json!({"ok": true})), &token())
            .unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.result, Some(serde_json::json!({"ok": true})));
    }

    #[test]
    fn ack_of_non_active_job_is_a_conflict() {
        let store = JobStore::new();
        let job = submit_simple(&store, "default", 0);
        let err = store.ack(&job.id, None, &token()).unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidTransition {
                from: JobState::Available,
                to: JobState::Completed
            }
        );
        // The recorded state is unchanged.
        assert_eq!(store.get(&job.id).unwrap().state, JobState::Available);
    }

    #[test]
    fn nack_with_attempts_left_requeues() {
        let store = JobStore::new();
        submit_simple(&store, "default", 0);
        let job = fetch_one(&store, "default").unwrap();
        let back = store
            .nack(&job.id, Some(serde_json::json!({"msg": "boom"})), &token())
            .unwrap();
        assert_eq!(back.state, JobState::Available);
        assert_eq!(back.error, Some(serde_json::json!({"msg": "boom"})));
        // It can be fetched again.
        assert_eq!(fetch_one(&store, "default").unwrap().id, job.id);
    }

    #[test]
    fn nack_exhaustion_discards() {
        let store = JobStore::new();
        let job = submit_simple(&store, "default", 0);
        for round in 1..=3u32 {
            let fetched = fetch_one(&store, "default").expect("job should be dispatchable");
            assert_eq!(fetched.attempt, round);
            let after = store.nack(&job.id, None, &token()).unwrap();
            if round < 3 {
                assert_eq!(after.state, JobState::Available);
            } else {
                assert_eq!(after.state, JobState::Discarded);
            }
        }
        assert!(fetch_one(&store, "default").is_none());
    }

    #[test]
    fn cancel_removes_from_queue() {
        let store = JobStore::new();
        let job = submit_simple(&store, "default", 0);
        let cancelled = store.cancel(&job.id, &token()).unwrap();
        assert_eq!(cancelled.state, JobState::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert!(fetch_one(&store, "default").is_none());
    }

    #[test]
    fn terminal_states_reject_repeat_operations() {
        let store = JobStore::new();
        let job = submit_simple(&store, "default", 0);
        let first = store.cancel(&job.id, &token()).unwrap();

        let err = store.cancel(&job.id, &token()).unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidTransition {
                from: JobState::Cancelled,
                to: JobState::Cancelled
            }
        );
        // Timestamps were not touched by the rejected call.
        assert_eq!(store.get(&job.id).unwrap().cancelled_at, first.cancelled_at);
    }

    #[test]
    fn cancelled_token_aborts_before_mutation() {
        let store = JobStore::new();
        let job = submit_simple(&store, "default", 0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_matches!(store.cancel(&job.id, &cancel), Err(CoreError::Cancelled));
        assert_matches!(
            store.fetch(FetchRequest::default(), &cancel),
            Err(CoreError::Cancelled)
        );
        assert_matches!(store.ack(&job.id, None, &cancel), Err(CoreError::Cancelled));
        assert_matches!(store.nack(&job.id, None, &cancel), Err(CoreError::Cancelled));
        assert_eq!(store.get(&job.id).unwrap().state, JobState::Available);
    }

    #[test]
    fn list_queues_includes_drained_queues() {
        let store = JobStore::new();
        submit_simple(&store, "email", 0);
        fetch_one(&store, "email").unwrap();
        submit_simple(&store, "reports", 0);

        assert_eq!(
            store.list_queues(),
            vec![
                QueueInfo {
                    name: "email".into(),
                    available: 0
                },
                QueueInfo {
                    name: "reports".into(),
                    available: 1
                },
            ]
        );
    }

    #[test]
    fn list_jobs_filters_by_state_and_queue() {
        let store = JobStore::new();
        submit_simple(&store, "email", 0);
        submit_simple(&store, "reports", 0);
        fetch_one(&store, "email").unwrap();

        let active = store.list_jobs(JobFilter {
            state: Some(JobState::Active),
            ..Default::default()
        });
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].queue, "email");

        let reports = store.list_jobs(JobFilter {
            queue: Some("reports".into()),
            ..Default::default()
        });
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].state, JobState::Available);
    }

    #[test]
    fn stats_counts_jobs_and_depths() {
        let store = JobStore::new();
        submit_simple(&store, "default", 0);
        submit_simple(&store, "default", 0);
        fetch_one(&store, "default").unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_jobs, 2);
        assert_eq!(stats.active_jobs, 1);
        assert_eq!(stats.queue_depths.get("default"), Some(&1));
    }

    #[test]
    fn hook_sees_transitions_in_application_order() {
        let seen: Arc<Mutex<Vec<(Option<JobState>, JobState)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let store = JobStore::with_hook(Box::new(move |_, from, to| {
            sink.lock().unwrap().push((from, to));
        }));

        let job = store
            .submit("t", serde_json::json!([]), SubmitOptions::default())
            .unwrap();
        fetch_one(&store, "default").unwrap();
        store.ack(&job.id, None, &token()).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (None, JobState::Available),
                (Some(JobState::Available), JobState::Active),
                (Some(JobState::Active), JobState::Completed),
            ]
        );
    }

    #[test]
    fn nack_event_reports_final_state() {
        let seen: Arc<Mutex<Vec<(Option<JobState>, JobState)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let store = JobStore::with_hook(Box::new(move |_, from, to| {
            sink.lock().unwrap().push((from, to));
        }));

        let job = store
            .submit("t", serde_json::json!([]), SubmitOptions::default())
            .unwrap();
        fetch_one(&store, "default").unwrap();
        store.nack(&job.id, None, &token()).unwrap();

        // The retryable label collapses immediately: the emitted event
        // carries the final resulting state, not the transient one.
        assert_eq!(
            seen.lock().unwrap().last(),
            Some(&(Some(JobState::Active), JobState::Available))
        );
    }
}
