//! Outbound delivery events.
//!
//! Every stage of an order's life is announced on the system's
//! [`EventBus`](dispatch_framework::EventBus). Subscribers get typed values; the log gets
//! one structured line per event.

use crate::model::{ProviderTag, TrackingId};
use dispatch_framework::Event;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryEvent {
    OrderQueued {
        name: String,
        delay: Duration,
    },
    OrderReady {
        name: String,
    },
    ShippingStarted {
        name: String,
        provider: ProviderTag,
        tracking_id: TrackingId,
        latency: Duration,
    },
    Delivered {
        name: String,
        provider: ProviderTag,
        tracking_id: TrackingId,
    },
    ArchivedEvicted {
        name: String,
        tracking_id: TrackingId,
    },
    /// A completion unit was dropped before it could finish the delivery.
    DeliveryAbandoned {
        name: String,
        provider: ProviderTag,
        tracking_id: TrackingId,
    },
    /// A completion unit ran but the state refused the transition.
    CompletionFailed {
        name: String,
        tracking_id: TrackingId,
        reason: String,
    },
}

impl DeliveryEvent {
    /// The order name every event carries.
    pub fn name(&self) -> &str {
        match self {
            DeliveryEvent::OrderQueued { name, .. }
            | DeliveryEvent::OrderReady { name }
            | DeliveryEvent::ShippingStarted { name, .. }
            | DeliveryEvent::Delivered { name, .. }
            | DeliveryEvent::ArchivedEvicted { name, .. }
            | DeliveryEvent::DeliveryAbandoned { name, .. }
            | DeliveryEvent::CompletionFailed { name, .. } => name,
        }
    }
}

impl Event for DeliveryEvent {
    fn record(&self) {
        match self {
            DeliveryEvent::OrderQueued { name, delay } => {
                info!(order = %name, delay_ms = delay.as_millis() as u64, "Order queued")
            }
            DeliveryEvent::OrderReady { name } => info!(order = %name, "Order ready"),
            DeliveryEvent::ShippingStarted {
                name,
                provider,
                tracking_id,
                latency,
            } => info!(
                order = %name,
                %provider,
                %tracking_id,
                latency_ms = latency.as_millis() as u64,
                "Shipping started"
            ),
            DeliveryEvent::Delivered {
                name,
                provider,
                tracking_id,
            } => info!(order = %name, %provider, %tracking_id, "Delivered"),
            DeliveryEvent::ArchivedEvicted { name, tracking_id } => {
                info!(order = %name, %tracking_id, "Archive evicted")
            }
            DeliveryEvent::DeliveryAbandoned {
                name,
                provider,
                tracking_id,
            } => warn!(order = %name, %provider, %tracking_id, "Delivery abandoned"),
            DeliveryEvent::CompletionFailed {
                name,
                tracking_id,
                reason,
            } => warn!(order = %name, %tracking_id, %reason, "Completion failed"),
        }
    }
}
