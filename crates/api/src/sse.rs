//! Streaming adapter: one event-bus subscription per SSE connection.
//!
//! Each delivered event becomes a discrete SSE frame carrying the event's
//! bus-assigned id and type; an idle keepalive comment goes out on a fixed
//! interval so proxies can detect liveness. When the client disconnects the
//! stream is dropped, which drops the subscription guard and unsubscribes.

use std::collections::HashSet;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use torque_events::EventFilter;

use crate::state::AppState;

/// Query parameters of GET /events.
#[derive(Debug, Default, Deserialize)]
pub struct EventStreamParams {
    pub queue: Option<String>,
    pub job_id: Option<String>,
    /// Comma-separated accepted event types.
    pub types: Option<String>,
}

impl EventStreamParams {
    /// Convert to a bus filter. Empty strings count as unset.
    fn into_filter(self) -> EventFilter {
        let types: HashSet<String> = self
            .types
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        EventFilter {
            queue: self.queue.filter(|q| !q.is_empty()),
            job_id: self.job_id.filter(|j| !j.is_empty()),
            types,
        }
    }
}

/// GET /events
pub async fn event_stream(
    State(state): State<AppState>,
    Query(params): Query<EventStreamParams>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let keepalive = Duration::from_secs(state.config.sse_keepalive_secs);
    let sub = state.bus.subscribe(params.into_filter());
    tracing::debug!(subscriber_id = %sub.id(), "Event stream connected");

    let (guard, rx) = sub.into_parts();
    let stream = ReceiverStream::new(rx).map(move |event| {
        // The guard lives as long as the stream; dropping the stream
        // unsubscribes before the mailbox closes.
        let _keep = &guard;
        let frame = SseEvent::default()
            .id(event.id.to_string())
            .event(event.event_type.clone());
        Ok::<_, Infallible>(match frame.json_data(&event) {
            Ok(frame) => frame,
            // The envelope is plain serde types; this arm is unreachable in
            // practice, but a comment frame beats tearing down the stream.
            Err(_) => SseEvent::default().comment("undeliverable event"),
        })
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(keepalive).text("keepalive"))
}
