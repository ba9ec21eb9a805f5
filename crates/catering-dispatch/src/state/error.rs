//! Error types for delivery-state transitions.

use crate::model::{DeliveryStatus, ProviderTag, TrackingId};
use thiserror::Error;

/// A state transition that was refused. The state is left untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompletionError {
    /// No active entry exists for the tracking id.
    #[error("Unknown tracking id: {0}")]
    UnknownTracking(TrackingId),

    /// The entry already left `ongoing`.
    #[error("Delivery {0} already settled as {1:?}")]
    AlreadySettled(TrackingId, DeliveryStatus),

    /// The active entry belongs to a different provider than the one completing it.
    #[error("Delivery {tracking_id} belongs to {expected}, not {actual}")]
    ProviderMismatch {
        tracking_id: TrackingId,
        expected: ProviderTag,
        actual: ProviderTag,
    },

    /// The provider's active counter is already zero.
    #[error("Active counter for {0} would drop below zero")]
    CounterUnderflow(ProviderTag),
}
