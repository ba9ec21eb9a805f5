//! # Intake Queue
//!
//! The `IntakeQueue<T>` is an unbounded FIFO shared between any number of producers and
//! one consumer loop. Producers [`push`](IntakeQueue::push) to the tail; the consumer
//! suspends in [`next`](IntakeQueue::next) until an item is available.
//!
//! ## Requeueing
//!
//! A consumer that pops an item it cannot handle yet puts it back with
//! [`requeue`](IntakeQueue::requeue). The item goes to the **tail**, behind anything
//! pushed in the meantime, so the queue is FIFO per pass and not a priority queue:
//! once requeueing happens, submission order is no longer dispatch order.
//!
//! ## Closing
//!
//! [`close`](IntakeQueue::close) rejects further pushes and wakes the consumer. Items
//! still queued stay available to `next()` and to [`drain_pending`](IntakeQueue::drain_pending).

use crate::error::FrameworkError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    available: Notify,
}

/// A cloneable handle to a shared FIFO queue.
pub struct IntakeQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for IntakeQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for IntakeQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("IntakeQueue")
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> Default for IntakeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntakeQueue<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    items: VecDeque::new(),
                    closed: false,
                }),
                available: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item to the tail of the queue.
    ///
    /// Fails only once the queue has been closed.
    pub fn push(&self, item: T) -> Result<(), FrameworkError> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(FrameworkError::QueueClosed);
            }
            state.items.push_back(item);
        }
        self.shared.available.notify_one();
        Ok(())
    }

    /// Puts an item the consumer could not handle yet back at the tail.
    ///
    /// Unlike [`push`](Self::push) this is accepted on a closed queue, so an item
    /// popped right before shutdown is not lost.
    pub fn requeue(&self, item: T) {
        self.lock().items.push_back(item);
        self.shared.available.notify_one();
    }

    /// Removes and returns the front item, waiting until one is available.
    ///
    /// Returns `None` once the queue is closed and empty.
    ///
    /// Cancel safe: an item is only removed in the same poll that returns it.
    pub async fn next(&self) -> Option<T> {
        loop {
            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            // notify_one stores a permit, so a push between the unlock above and this
            // await still wakes us.
            self.shared.available.notified().await;
        }
    }

    /// Rejects further pushes and wakes any waiting consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.shared.available.notify_waiters();
        self.shared.available.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Takes every item still waiting, in queue order.
    pub fn drain_pending(&self) -> Vec<T> {
        self.lock().items.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_push_then_next_is_fifo() {
        let queue = IntakeQueue::new();
        queue.push("a").unwrap();
        queue.push("b").unwrap();
        queue.push("c").unwrap();

        assert_eq!(queue.next().await, Some("a"));
        assert_eq!(queue.next().await, Some("b"));
        assert_eq!(queue.next().await, Some("c"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_requeue_goes_behind_later_pushes() {
        let queue = IntakeQueue::new();
        queue.push("early").unwrap();
        let first = queue.next().await.unwrap();
        queue.push("late").unwrap();
        queue.requeue(first);

        assert_eq!(queue.next().await, Some("late"));
        assert_eq!(queue.next().await, Some("early"));
    }

    #[tokio::test]
    async fn test_next_waits_for_push() {
        let queue = IntakeQueue::new();
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.next().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!consumer.is_finished());

        queue.push(7).unwrap();
        assert_eq!(consumer.await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_close_wakes_consumer_and_rejects_push() {
        let queue: IntakeQueue<u32> = IntakeQueue::new();
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.next().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();

        assert_eq!(consumer.await.unwrap(), None);
        assert_eq!(queue.push(1), Err(FrameworkError::QueueClosed));
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_closed_queue_still_yields_remaining_items() {
        let queue = IntakeQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.close();
        queue.requeue(3);

        assert_eq!(queue.next().await, Some(1));
        assert_eq!(queue.drain_pending(), vec![2, 3]);
        assert_eq!(queue.next().await, None);
    }
}
