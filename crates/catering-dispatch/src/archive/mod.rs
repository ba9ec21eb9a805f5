//! # Archive Sweeper
//!
//! Completed deliveries leave an [`ArchiveRecord`] behind. The sweeper wakes every
//! `period`, evicts every record older than `ttl`, and announces each eviction.
//!
//! With `ttl == period` (the default) a record survives for at least one full period
//! and is gone by the end of the second: eviction happens somewhere in
//! `[completed_at + ttl, completed_at + ttl + period]`.
//!
//! Eviction never touches the provider counters or an `Ongoing` entry.

use crate::events::DeliveryEvent;
use crate::model::ArchiveRecord;
use crate::state::SharedDeliveryState;
use dispatch_framework::{EventBus, Shutdown};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

pub struct ArchiveSweeper {
    state: SharedDeliveryState,
    events: EventBus<DeliveryEvent>,
    period: Duration,
    ttl: Duration,
    prune_active: bool,
    shutdown: Shutdown,
}

impl ArchiveSweeper {
    pub fn new(
        state: SharedDeliveryState,
        events: EventBus<DeliveryEvent>,
        period: Duration,
        ttl: Duration,
        prune_active: bool,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            state,
            events,
            period,
            ttl,
            prune_active,
            shutdown,
        }
    }

    /// Sweeps once per period until shutdown is signalled.
    pub async fn run(mut self) {
        info!(
            period_ms = self.period.as_millis() as u64,
            ttl_ms = self.ttl.as_millis() as u64,
            "Archive sweeper started"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                _ = ticker.tick() => {
                    self.sweep(Instant::now());
                }
            }
        }

        info!(archived = self.state.archive_len(), "Archive sweeper stopped");
    }

    /// Evicts every record with `now - completed_at >= ttl` and announces it.
    ///
    /// Events go out after the state lock is released.
    pub fn sweep(&self, now: Instant) -> Vec<ArchiveRecord> {
        let evicted = self.state.evict_expired(self.ttl, now, self.prune_active);
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), remaining = self.state.archive_len(), "Swept archive");
        }
        for record in &evicted {
            self.events.emit(DeliveryEvent::ArchivedEvicted {
                name: record.name.clone(),
                tracking_id: record.tracking_id,
            });
        }
        evicted
    }
}
