use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use torque_core::{HistoryStore, JobStore};
use torque_events::{transition_event, EventBus, HistoryRelay, TransitionRecord};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The job store. Its transition hook feeds both the event bus and the
    /// history relay.
    pub store: Arc<JobStore>,
    /// Event bus the streaming endpoint subscribes to.
    pub bus: Arc<EventBus>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Fires on graceful shutdown; passed into cancellable store
    /// operations so in-flight requests abort cleanly.
    pub shutdown: CancellationToken,
}

/// Wire up the engine: event bus, job store, and the history relay.
///
/// The store's hook runs after each transition's critical section: it
/// forwards the record to the relay (write-through history, log-and-continue)
/// and publishes the corresponding event to the bus. Returns the state and
/// the relay, which the caller is expected to spawn.
pub fn build_state(
    config: ServerConfig,
    history: Arc<dyn HistoryStore>,
) -> (AppState, HistoryRelay) {
    let bus = Arc::new(EventBus::new());
    let (relay_tx, relay) = HistoryRelay::channel(history);

    let hook_bus = Arc::clone(&bus);
    let store = JobStore::with_hook(Box::new(move |job, from, to| {
        let record = TransitionRecord {
            job: job.clone(),
            from,
            to,
        };
        // History first, then fan-out, mirroring the write-through order
        // observers expect. Send failure only means the relay is gone
        // (shutdown); job processing is unaffected either way.
        let _ = relay_tx.send(record.clone());
        hook_bus.publish(transition_event(&record));
    }));

    let state = AppState {
        store: Arc::new(store),
        bus,
        config: Arc::new(config),
        shutdown: CancellationToken::new(),
    };
    (state, relay)
}
