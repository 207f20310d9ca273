//! Real-time event distribution for the job engine.
//!
//! Building blocks:
//!
//! - [`Event`] — the canonical event envelope, with a bus-assigned
//!   monotonically increasing identifier.
//! - [`EventBus`] — filtered fan-out hub with per-subscriber bounded
//!   mailboxes and a non-blocking, drop-on-full delivery policy.
//! - [`EventFilter`] / [`Subscription`] — what a subscriber sees, and the
//!   handle whose drop unsubscribes it.
//! - [`HistoryRelay`] — background write-through of every transition to an
//!   external [`torque_core::HistoryStore`].

pub mod bus;
pub mod event;
pub mod relay;

pub use bus::{EventBus, Subscription, SubscriptionGuard, MAILBOX_CAPACITY};
pub use event::{types, Event, EventFilter};
pub use relay::{transition_event, HistoryRelay, TransitionRecord};
