use crate::archive::ArchiveSweeper;
use crate::clients::OrderClient;
use crate::config::DispatchConfig;
use crate::dispatcher::{DispatchLoop, Dispatcher};
use crate::error::DispatchError;
use crate::events::DeliveryEvent;
use crate::model::OrderRequest;
use crate::provider::{registry, ProviderRegistry, ShipContext};
use crate::state::SharedDeliveryState;
use dispatch_framework::{
    shutdown, EventBus, EventEnvelope, FrameworkError, IntakeQueue, PoolReport, ShutdownTrigger,
    TaskPool,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// What happened to the work still in the system when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Outcome of every completion unit the system ever ran.
    pub tasks: PoolReport,
    /// Orders still waiting for their ready time, discarded.
    pub undispatched: usize,
}

/// The running dispatch system.
///
/// # Example
///
/// ```rust,no_run
/// use catering_dispatch::config::DispatchConfig;
/// use catering_dispatch::lifecycle::DispatchSystem;
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), catering_dispatch::error::DispatchError> {
/// let system = DispatchSystem::new(DispatchConfig::default())?;
/// system.order_client.add_order("A", Duration::from_secs(5))?;
/// let report = system.shutdown().await?;
/// println!("{} orders never dispatched", report.undispatched);
/// # Ok(())
/// # }
/// ```
pub struct DispatchSystem {
    pub order_client: OrderClient,
    state: SharedDeliveryState,
    events: EventBus<DeliveryEvent>,
    pool: TaskPool,
    queue: IntakeQueue<OrderRequest>,
    trigger: ShutdownTrigger,
    handles: Vec<JoinHandle<()>>,
    drain_on_shutdown: bool,
}

impl DispatchSystem {
    /// Validates `config`, wires every component, and starts the dispatch loop and the
    /// archive sweeper on the current runtime.
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;

        let registry = ProviderRegistry::new(registry::services(&config.providers))?;
        let state = SharedDeliveryState::new(registry.tags());
        let events = EventBus::new(config.event_buffer);
        let pool = TaskPool::new("deliveries");
        let queue = IntakeQueue::new();
        let (trigger, signal) = shutdown::channel();

        let ctx = ShipContext::new(state.clone(), pool.clone(), events.clone(), config.rng_seed);
        let dispatcher = Dispatcher::new(registry, ctx);

        let dispatch_handle = tokio::spawn(
            DispatchLoop::new(
                queue.clone(),
                dispatcher,
                config.poll_interval(),
                signal.clone(),
            )
            .run(),
        );
        let sweeper_handle = tokio::spawn(
            ArchiveSweeper::new(
                state.clone(),
                events.clone(),
                config.sweep_interval(),
                config.archive_ttl(),
                config.prune_on_evict,
                signal,
            )
            .run(),
        );

        info!(
            poll_interval_ms = config.poll_interval_ms,
            sweep_interval_ms = config.sweep_interval_ms,
            seeded = config.rng_seed.is_some(),
            "Dispatch system started"
        );

        Ok(Self {
            order_client: OrderClient::new(queue.clone(), events.clone()),
            state,
            events,
            pool,
            queue,
            trigger,
            handles: vec![dispatch_handle, sweeper_handle],
            drain_on_shutdown: config.drain_on_shutdown,
        })
    }

    /// Read access to the delivery state.
    pub fn state(&self) -> &SharedDeliveryState {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope<DeliveryEvent>> {
        self.events.subscribe()
    }

    /// Stops the loops, then drains or aborts the in-flight deliveries.
    pub async fn shutdown(self) -> Result<ShutdownReport, DispatchError> {
        info!("Shutting down dispatch system...");

        self.trigger.trigger();
        self.queue.close();

        let mut failure = None;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "System task failed");
                failure.get_or_insert(FrameworkError::TaskFailed(e.to_string()));
            }
        }

        let undispatched = self.queue.drain_pending().len();
        if undispatched > 0 {
            warn!(undispatched, "Discarding orders that never became ready");
        }

        let tasks = if self.drain_on_shutdown {
            self.pool.drain().await
        } else {
            self.pool.abort_all().await
        };

        if let Some(e) = failure {
            return Err(e.into());
        }

        info!(?tasks, undispatched, "Dispatch system shutdown complete.");
        Ok(ShutdownReport {
            tasks,
            undispatched,
        })
    }
}
