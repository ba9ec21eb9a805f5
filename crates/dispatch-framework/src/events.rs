//! # Event Bus
//!
//! Long-running loops report what they do as typed events. An [`EventBus<E>`] does two
//! things with every emitted event:
//!
//! 1. **Records it** through `tracing` via [`Event::record`], so a plain log already
//!    tells the whole story.
//! 2. **Fans it out** on a `tokio::sync::broadcast` channel to every subscriber
//!    (observability collaborators, tests).
//!
//! Emission never blocks and never fails: with no subscribers the event is only logged,
//! and a slow subscriber sees `RecvError::Lagged` rather than stalling the emitter.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tokio::sync::broadcast;

/// A typed event that knows how to log itself.
pub trait Event: Clone + Debug + Send + Sync + 'static {
    /// Writes the event to the active `tracing` subscriber.
    ///
    /// The default logs the `Debug` form at debug level; domain events usually
    /// override this with structured fields.
    fn record(&self) {
        tracing::debug!(event = ?self, "Event");
    }
}

/// An event stamped with the wall-clock time it was emitted.
#[derive(Debug, Clone)]
pub struct EventEnvelope<E> {
    pub timestamp: DateTime<Utc>,
    pub event: E,
}

/// Cheaply cloneable handle for emitting events.
#[derive(Clone)]
pub struct EventBus<E: Event> {
    tx: broadcast::Sender<EventEnvelope<E>>,
}

impl<E: Event> EventBus<E> {
    /// Creates a bus whose subscribers can lag by up to `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: E) {
        event.record();
        let envelope = EventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        // No subscribers is fine; the event has already been logged.
        let _ = self.tx.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope<E>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<E: Event> Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
