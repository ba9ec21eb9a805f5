use super::Dispatcher;
use crate::events::DeliveryEvent;
use crate::model::OrderRequest;
use dispatch_framework::{IntakeQueue, Shutdown};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, trace};

/// The readiness-gated consumer of the intake queue.
///
/// Each iteration takes the front order. A ready order is dispatched; an order whose
/// `ready_at` is still in the future goes back to the **tail** of the queue and the
/// loop pauses for `poll_interval` before looking again.
///
/// This is polling, not a priority queue. An order is never dispatched before its
/// `ready_at`, and is dispatched at most about one poll interval per waiting order
/// after it, but a requeued order lands behind anything submitted meanwhile, so
/// dispatch order is not submission order.
///
/// The loop suspends only in `next()` and in the poll pause; it never waits on a
/// delivery.
pub struct DispatchLoop {
    queue: IntakeQueue<OrderRequest>,
    dispatcher: Dispatcher,
    poll_interval: Duration,
    shutdown: Shutdown,
}

impl DispatchLoop {
    pub fn new(
        queue: IntakeQueue<OrderRequest>,
        dispatcher: Dispatcher,
        poll_interval: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            poll_interval,
            shutdown,
        }
    }

    /// Runs until shutdown is signalled or the queue is closed and empty.
    pub async fn run(mut self) {
        info!(poll_interval_ms = self.poll_interval.as_millis() as u64, "Dispatch loop started");

        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                order = self.queue.next() => order,
            };
            let Some(order) = next else { break };

            if !order.is_ready(Instant::now()) {
                trace!(order = %order.name, pending = self.queue.len() + 1, "Not ready, requeued");
                self.queue.requeue(order);
                tokio::select! {
                    biased;
                    _ = self.shutdown.wait() => break,
                    _ = tokio::time::sleep(self.poll_interval) => continue,
                }
            }

            self.dispatcher
                .context()
                .events
                .emit(DeliveryEvent::OrderReady {
                    name: order.name.clone(),
                });
            if let Err(e) = self.dispatcher.dispatch(order) {
                error!(error = %e, "Dispatch failed");
            }
        }

        info!(pending = self.queue.len(), "Dispatch loop stopped");
    }
}
