//! # Order Client
//!
//! The submission side of the intake queue. `add_order` never waits on the dispatcher:
//! it stamps the order with its `ready_at`, appends it, and returns.

use crate::error::DispatchError;
use crate::events::DeliveryEvent;
use crate::model::{OrderRequest, MAX_DELAY};
use dispatch_framework::{EventBus, IntakeQueue};
use std::time::Duration;
use tracing::{debug, instrument};

/// Cloneable handle for submitting orders.
#[derive(Clone, Debug)]
pub struct OrderClient {
    queue: IntakeQueue<OrderRequest>,
    events: EventBus<DeliveryEvent>,
}

impl OrderClient {
    pub fn new(queue: IntakeQueue<OrderRequest>, events: EventBus<DeliveryEvent>) -> Self {
        Self { queue, events }
    }

    /// Queues an order that becomes ready `delay` from now.
    ///
    /// Names are not required to be unique. Fails when `delay` exceeds [`MAX_DELAY`]
    /// or once the system is shutting down.
    #[instrument(skip(self))]
    pub fn add_order(&self, name: &str, delay: Duration) -> Result<(), DispatchError> {
        debug!("add_order called");
        if delay > MAX_DELAY {
            return Err(DispatchError::DelayOutOfRange(delay));
        }
        self.queue.push(OrderRequest::new(name, delay))?;
        self.events.emit(DeliveryEvent::OrderQueued {
            name: name.to_string(),
            delay,
        });
        Ok(())
    }

    /// Orders submitted and not yet dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_framework::FrameworkError;

    #[tokio::test(start_paused = true)]
    async fn test_add_order_appends_with_ready_at() {
        let queue = IntakeQueue::new();
        let client = OrderClient::new(queue.clone(), EventBus::new(8));
        let before = tokio::time::Instant::now();

        client.add_order("A", Duration::from_secs(5)).unwrap();
        client.add_order("A", Duration::ZERO).unwrap();
        assert_eq!(client.pending(), 2);

        let first = queue.next().await.unwrap();
        assert_eq!(first.name, "A");
        assert_eq!(first.ready_at, before + Duration::from_secs(5));
        let second = queue.next().await.unwrap();
        assert_eq!(second.ready_at, before);
    }

    #[tokio::test]
    async fn test_add_order_announces() {
        let events = EventBus::new(8);
        let mut rx = events.subscribe();
        let client = OrderClient::new(IntakeQueue::new(), events);

        client.add_order("B", Duration::from_secs(2)).unwrap();
        assert_eq!(
            rx.recv().await.unwrap().event,
            DeliveryEvent::OrderQueued {
                name: "B".to_string(),
                delay: Duration::from_secs(2),
            }
        );
    }

    #[tokio::test]
    async fn test_add_order_rejects_delay_beyond_max() {
        let client = OrderClient::new(IntakeQueue::new(), EventBus::new(8));
        let huge = Duration::from_secs(u64::MAX);

        assert_eq!(
            client.add_order("A", huge),
            Err(DispatchError::DelayOutOfRange(huge))
        );
        assert_eq!(client.pending(), 0);
        client.add_order("A", MAX_DELAY).unwrap();
        assert_eq!(client.pending(), 1);
    }

    #[test]
    fn test_add_order_rejected_after_close() {
        let queue = IntakeQueue::new();
        let client = OrderClient::new(queue.clone(), EventBus::new(8));
        queue.close();

        let err = client.add_order("late", Duration::ZERO).unwrap_err();
        assert_eq!(err, DispatchError::Framework(FrameworkError::QueueClosed));
        assert_eq!(client.pending(), 0);
    }
}
