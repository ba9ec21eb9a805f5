//! # Dispatch
//!
//! [`Dispatcher::dispatch`] turns a ready [`OrderRequest`] into a shipped order:
//! pick a provider uniformly at random, mint a tracking id, and hand the order to the
//! provider's `ship`. It returns immediately; completion happens on the task pool.
//!
//! [`DispatchLoop`] is the long-lived consumer that feeds it from the intake queue.

mod dispatch_loop;

pub use dispatch_loop::DispatchLoop;

use crate::error::DispatchError;
use crate::model::{DispatchedOrder, OrderRequest};
use crate::provider::{ProviderRegistry, ShipContext};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: ProviderRegistry,
    ctx: ShipContext,
}

impl Dispatcher {
    pub fn new(registry: ProviderRegistry, ctx: ShipContext) -> Self {
        Self { registry, ctx }
    }

    pub fn context(&self) -> &ShipContext {
        &self.ctx
    }

    /// Ships a ready order with a randomly selected provider.
    pub fn dispatch(&self, request: OrderRequest) -> Result<DispatchedOrder, DispatchError> {
        let service = self
            .ctx
            .with_rng(|rng| self.registry.select(rng))
            .ok_or(DispatchError::NoProviders)?;
        let order = DispatchedOrder::from_request(request);
        debug!(order = %order.name, provider = %service.tag(), tracking_id = %order.tracking_id, "Dispatching");
        service.ship(order.clone(), &self.ctx);
        Ok(order)
    }
}
