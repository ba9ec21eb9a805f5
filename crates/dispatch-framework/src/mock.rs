//! # Test Helpers
//!
//! Utilities for testing systems built on the framework without sprinkling fixed
//! `sleep`s through the tests.
//!
//! | Helper | Waits for |
//! |--------|-----------|
//! | [`expect_event`] | the first event on a bus subscription matching a predicate |
//! | [`collect_events`] | `count` events matching a predicate |
//! | [`wait_until`] | an arbitrary condition, polled on an interval |
//!
//! Every helper takes a timeout and gives up instead of hanging the test.
//!
//! ## Virtual Time
//!
//! All waiting goes through `tokio::time`, so under
//! `#[tokio::test(start_paused = true)]` a thirty-second timeout costs no real time:
//! the runtime jumps the clock forward whenever every task is idle.
//!
//! ```rust
//! use dispatch_framework::mock::expect_event;
//! use dispatch_framework::{Event, EventBus};
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Signal { Started, Finished(u32) }
//! impl Event for Signal {}
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus = EventBus::new(16);
//!     let mut rx = bus.subscribe();
//!
//!     bus.emit(Signal::Started);
//!     bus.emit(Signal::Finished(7));
//!
//!     let finished = expect_event(&mut rx, Duration::from_secs(1), |e| {
//!         matches!(e, Signal::Finished(_))
//!     })
//!     .await;
//!     assert_eq!(finished, Some(Signal::Finished(7)));
//! }
//! ```

use crate::events::{Event, EventEnvelope};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};

/// Waits for the first event matching `pred`, skipping the rest.
///
/// Returns `None` on timeout or when the bus is gone. Lagged receivers keep going
/// from the oldest event still buffered.
pub async fn expect_event<E, F>(
    rx: &mut broadcast::Receiver<EventEnvelope<E>>,
    within: Duration,
    mut pred: F,
) -> Option<E>
where
    E: Event,
    F: FnMut(&E) -> bool,
{
    let search = async {
        loop {
            match rx.recv().await {
                Ok(envelope) if pred(&envelope.event) => return Some(envelope.event),
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    };
    tokio::time::timeout(within, search).await.ok().flatten()
}

/// Collects up to `count` events matching `pred`.
///
/// Returns early with what it has on timeout, so callers assert on the length.
pub async fn collect_events<E, F>(
    rx: &mut broadcast::Receiver<EventEnvelope<E>>,
    count: usize,
    within: Duration,
    mut pred: F,
) -> Vec<E>
where
    E: Event,
    F: FnMut(&E) -> bool,
{
    let mut found = Vec::with_capacity(count);
    let deadline = tokio::time::Instant::now() + within;
    while found.len() < count {
        let left = deadline.saturating_duration_since(tokio::time::Instant::now());
        match expect_event(rx, left, &mut pred).await {
            Some(event) => found.push(event),
            None => break,
        }
    }
    found
}

/// Polls `cond` every `every` until it holds or `within` elapses.
pub async fn wait_until<F>(within: Duration, every: Duration, mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    let poll = async {
        loop {
            if cond() {
                return;
            }
            tokio::time::sleep(every).await;
        }
    };
    tokio::time::timeout(within, poll).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Tick {
        Even(u32),
        Odd(u32),
    }

    impl Event for Tick {}

    #[tokio::test(start_paused = true)]
    async fn test_expect_event_times_out() {
        let bus: EventBus<Tick> = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.emit(Tick::Odd(1));

        let found = expect_event(&mut rx, Duration::from_secs(30), |e| {
            matches!(e, Tick::Even(_))
        })
        .await;
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_collect_events_filters() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        for n in 0..6 {
            bus.emit(if n % 2 == 0 { Tick::Even(n) } else { Tick::Odd(n) });
        }

        let evens = collect_events(&mut rx, 3, Duration::from_secs(1), |e| {
            matches!(e, Tick::Even(_))
        })
        .await;
        assert_eq!(evens, vec![Tick::Even(0), Tick::Even(2), Tick::Even(4)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_sees_background_progress() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let counter = counter.clone();
            tokio::spawn(async move {
                for _ in 0..3 {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let reached = wait_until(Duration::from_secs(10), Duration::from_millis(100), || {
            counter.load(Ordering::SeqCst) == 3
        })
        .await;
        assert!(reached);
    }
}
