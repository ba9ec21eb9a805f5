use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Opaque, never-reused identifier assigned to an order when it is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackingId(pub Uuid);

impl TrackingId {
    /// Mints a fresh random (v4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackingId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Longest delay an order may be submitted with (one year).
pub const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// An order waiting in the intake queue.
///
/// `name` is scoped to the submission and is not required to be unique.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub name: String,
    pub ready_at: Instant,
}

impl OrderRequest {
    /// Creates a request that becomes ready `delay` from now.
    ///
    /// Delays beyond [`MAX_DELAY`] are clamped to it.
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            ready_at: Instant::now() + delay.min(MAX_DELAY),
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        now >= self.ready_at
    }
}

/// An order that has been handed to a provider.
///
/// Owned by its completion unit until the delivery completes.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedOrder {
    pub name: String,
    pub tracking_id: TrackingId,
}

impl DispatchedOrder {
    /// Turns a ready request into a dispatched order with a freshly minted tracking id.
    pub fn from_request(request: OrderRequest) -> Self {
        Self {
            name: request.name,
            tracking_id: TrackingId::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_request_ready_after_delay() {
        let request = OrderRequest::new("A", Duration::from_secs(5));
        assert!(!request.is_ready(Instant::now()));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(request.is_ready(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_delay_is_clamped() {
        let now = Instant::now();
        let request = OrderRequest::new("far", Duration::from_secs(u64::MAX));
        assert_eq!(request.ready_at, now + MAX_DELAY);
        assert!(!request.is_ready(now));
    }

    #[tokio::test]
    async fn test_dispatch_mints_distinct_tracking_ids() {
        let first = DispatchedOrder::from_request(OrderRequest::new("A", Duration::ZERO));
        let second = DispatchedOrder::from_request(OrderRequest::new("A", Duration::ZERO));
        assert_eq!(first.name, second.name);
        assert_ne!(first.tracking_id, second.tracking_id);
    }
}
