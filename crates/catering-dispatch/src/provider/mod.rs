//! # Delivery Providers
//!
//! A provider is a delivery capability characterized by its latency distribution.
//! The set is closed and small (Uklon, Uber), and every provider ships the same way:
//!
//! 1. Sample a latency uniformly from the provider's range.
//! 2. Take a [`DeliveryLease`]: record the order as `Ongoing` and bump the provider's
//!    counter, in one critical section.
//! 3. Emit `ShippingStarted`.
//! 4. Spawn a **completion unit** onto the system's [`TaskPool`]: sleep for the
//!    latency, then settle the lease (finished + archived + counter released, in one
//!    critical section) and emit `Delivered`.
//!
//! That routine is the provided method [`DeliveryService::ship`]; implementors only
//! supply their [`tag`](DeliveryService::tag) and [`latency`](DeliveryService::latency).
//! No provider touches the state directly.
//!
//! `ship` returns as soon as the unit is spawned; it never waits for the delivery.
//!
//! ## Structure
//!
//! - [`services`] - [`Uklon`] and [`Uber`]
//! - [`registry`] - [`ProviderRegistry`], the uniform random selection
//! - [`lease`] - [`DeliveryLease`], the RAII guard a completion unit owns

pub mod lease;
pub mod registry;
pub mod services;

pub use lease::DeliveryLease;
pub use registry::ProviderRegistry;
pub use services::{Uber, Uklon};

use crate::config::LatencyConfig;
use crate::events::DeliveryEvent;
use crate::model::{DispatchedOrder, ProviderTag};
use crate::state::SharedDeliveryState;
use dispatch_framework::{EventBus, TaskPool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Everything a provider needs to ship: the state to record into, the pool to run
/// completion units on, the bus to announce on, and the shared random source.
#[derive(Clone, Debug)]
pub struct ShipContext {
    pub state: SharedDeliveryState,
    pub pool: TaskPool,
    pub events: EventBus<DeliveryEvent>,
    rng: Arc<Mutex<StdRng>>,
}

impl ShipContext {
    /// Builds a context; `seed` makes selection and latencies reproducible.
    pub fn new(
        state: SharedDeliveryState,
        pool: TaskPool,
        events: EventBus<DeliveryEvent>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state,
            pool,
            events,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Runs `f` with exclusive access to the shared random source.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

/// The "ship" capability shared by every provider.
pub trait DeliveryService: Send + Sync + Debug {
    fn tag(&self) -> ProviderTag;

    fn latency(&self) -> LatencyConfig;

    fn sample_latency(&self, rng: &mut StdRng) -> Duration {
        Duration::from_millis(rng.gen_range(self.latency().range_ms()))
    }

    /// Records the order as ongoing and spawns its completion unit.
    ///
    /// Returns the sampled latency.
    fn ship(&self, order: DispatchedOrder, ctx: &ShipContext) -> Duration {
        let provider = self.tag();
        let latency = ctx.with_rng(|rng| self.sample_latency(rng));
        debug!(order = %order.name, %provider, ?latency, "Shipping");

        let lease = DeliveryLease::begin(order, provider, ctx.state.clone(), ctx.events.clone());
        ctx.events.emit(DeliveryEvent::ShippingStarted {
            name: lease.order().name.clone(),
            provider,
            tracking_id: lease.order().tracking_id,
            latency,
        });

        ctx.pool.spawn(complete_after(lease, latency));
        latency
    }
}

/// The completion unit: one sleep, then one atomic settle.
async fn complete_after(lease: DeliveryLease, latency: Duration) {
    tokio::time::sleep(latency).await;
    lease.complete(Instant::now());
}
