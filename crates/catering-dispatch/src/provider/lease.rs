//! The RAII handle a completion unit holds for its ongoing delivery.

use crate::events::DeliveryEvent;
use crate::model::{DispatchedOrder, ProviderTag};
use crate::state::SharedDeliveryState;
use dispatch_framework::EventBus;
use tokio::time::Instant;

/// Ownership of one `Ongoing` entry in the shared state.
///
/// Created by [`begin`](DeliveryLease::begin), which records the entry and bumps the
/// provider's counter. Exactly one of two things then settles it:
///
/// - [`complete`](DeliveryLease::complete) finishes and archives the delivery, then
///   emits `Delivered`.
/// - Dropping the lease unsettled (the completion unit panicked or was aborted at
///   shutdown) marks the entry `Abandoned`, releases the counter, and emits
///   `DeliveryAbandoned`.
///
/// Either way the provider's counter is released once, so no path leaks it.
#[derive(Debug)]
pub struct DeliveryLease {
    order: DispatchedOrder,
    provider: ProviderTag,
    state: SharedDeliveryState,
    events: EventBus<DeliveryEvent>,
    settled: bool,
}

impl DeliveryLease {
    pub fn begin(
        order: DispatchedOrder,
        provider: ProviderTag,
        state: SharedDeliveryState,
        events: EventBus<DeliveryEvent>,
    ) -> Self {
        state.begin_delivery(&order, provider, Instant::now());
        Self {
            order,
            provider,
            state,
            events,
            settled: false,
        }
    }

    pub fn order(&self) -> &DispatchedOrder {
        &self.order
    }

    /// Finishes the delivery at `at`. Events go out after the state lock is released.
    pub fn complete(mut self, at: Instant) {
        self.settled = true;
        let event = match self.state.finish_delivery(&self.order, self.provider, at) {
            Ok(()) => DeliveryEvent::Delivered {
                name: self.order.name.clone(),
                provider: self.provider,
                tracking_id: self.order.tracking_id,
            },
            Err(e) => DeliveryEvent::CompletionFailed {
                name: self.order.name.clone(),
                tracking_id: self.order.tracking_id,
                reason: e.to_string(),
            },
        };
        self.events.emit(event);
    }
}

impl Drop for DeliveryLease {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let event = match self
            .state
            .abandon_delivery(self.order.tracking_id, self.provider)
        {
            Ok(()) => DeliveryEvent::DeliveryAbandoned {
                name: self.order.name.clone(),
                provider: self.provider,
                tracking_id: self.order.tracking_id,
            },
            Err(e) => DeliveryEvent::CompletionFailed {
                name: self.order.name.clone(),
                tracking_id: self.order.tracking_id,
                reason: e.to_string(),
            },
        };
        self.events.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliveryStatus, OrderRequest};
    use std::time::Duration;

    fn setup() -> (SharedDeliveryState, EventBus<DeliveryEvent>) {
        (
            SharedDeliveryState::new(ProviderTag::ALL),
            EventBus::new(16),
        )
    }

    fn order(name: &str) -> DispatchedOrder {
        DispatchedOrder::from_request(OrderRequest::new(name, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_complete_finishes_and_emits_delivered() {
        let (state, events) = setup();
        let mut rx = events.subscribe();
        let lease = DeliveryLease::begin(order("A"), ProviderTag::Uklon, state.clone(), events);
        let tracking_id = lease.order().tracking_id;
        assert_eq!(state.active_deliveries(ProviderTag::Uklon), 1);

        lease.complete(Instant::now());

        assert_eq!(state.status(tracking_id), Some(DeliveryStatus::Finished));
        assert_eq!(state.active_deliveries(ProviderTag::Uklon), 0);
        let event = rx.recv().await.unwrap().event;
        assert!(matches!(event, DeliveryEvent::Delivered { ref name, .. } if name == "A"));
    }

    #[tokio::test]
    async fn test_drop_unsettled_abandons() {
        let (state, events) = setup();
        let mut rx = events.subscribe();
        let lease = DeliveryLease::begin(order("B"), ProviderTag::Uber, state.clone(), events);
        let tracking_id = lease.order().tracking_id;

        drop(lease);

        assert_eq!(state.status(tracking_id), Some(DeliveryStatus::Abandoned));
        assert_eq!(state.active_deliveries(ProviderTag::Uber), 0);
        assert_eq!(state.archive_len(), 0);
        let event = rx.recv().await.unwrap().event;
        assert!(matches!(event, DeliveryEvent::DeliveryAbandoned { .. }));
    }

    #[tokio::test]
    async fn test_complete_after_out_of_band_settle_reports_failure() {
        let (state, events) = setup();
        let mut rx = events.subscribe();
        let lease = DeliveryLease::begin(order("D"), ProviderTag::Uber, state.clone(), events);
        let tracking_id = lease.order().tracking_id;
        state.abandon_delivery(tracking_id, ProviderTag::Uber).unwrap();
        let before = state.snapshot();

        lease.complete(Instant::now());

        let after = state.snapshot();
        assert_eq!(after.counters, before.counters);
        assert_eq!(after.counter(ProviderTag::Uber), 0);
        assert_eq!(state.status(tracking_id), Some(DeliveryStatus::Abandoned));
        assert_eq!(state.archive_len(), 0);
        match rx.recv().await.unwrap().event {
            DeliveryEvent::CompletionFailed {
                name,
                tracking_id: failed,
                reason,
            } => {
                assert_eq!(name, "D");
                assert_eq!(failed, tracking_id);
                assert!(reason.contains("already settled"), "{reason}");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(state.is_consistent());
    }

    #[tokio::test]
    async fn test_panicking_unit_does_not_leak_counter() {
        let (state, events) = setup();
        let lease = DeliveryLease::begin(order("C"), ProviderTag::Uklon, state.clone(), events);
        let tracking_id = lease.order().tracking_id;

        let unit = tokio::spawn(async move {
            let _lease = lease;
            panic!("completion unit blew up");
        });
        assert!(unit.await.unwrap_err().is_panic());

        assert_eq!(state.status(tracking_id), Some(DeliveryStatus::Abandoned));
        assert_eq!(state.active_deliveries(ProviderTag::Uklon), 0);
        assert!(state.is_consistent());
    }
}
