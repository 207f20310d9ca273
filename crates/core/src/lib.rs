//! Core job-lifecycle engine: job records, the state-transition policy, and
//! the in-memory store with priority-ordered dispatch queues.
//!
//! This crate has zero internal dependencies; the event and HTTP layers
//! build on top of it. State-transition notifications leave through the
//! [`store::TransitionHook`] seam so the core stays free of any knowledge
//! of the event bus.

pub mod error;
pub mod history;
pub mod job;
pub mod state;
pub mod store;

pub use error::CoreError;
pub use history::{HistoryError, HistoryStore, MemoryHistory, StateChange};
pub use job::{Job, SubmitOptions, DEFAULT_MAX_ATTEMPTS, DEFAULT_QUEUE};
pub use state::JobState;
pub use store::{FetchRequest, JobFilter, JobStore, QueueInfo, StoreStats, TransitionHook};
