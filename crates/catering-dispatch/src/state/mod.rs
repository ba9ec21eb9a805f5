//! # Shared Delivery State
//!
//! Every piece of mutable delivery bookkeeping lives here, behind **one** mutex:
//!
//! - **counters**: provider → number of ongoing deliveries
//! - **active index**: tracking id → (provider, status, dispatched at)
//! - **archive index**: tracking id → (order name, completed at)
//!
//! [`SharedDeliveryState`] is a cheap `Arc` handle. The dispatcher, every completion
//! unit and the archive sweeper each hold a clone; nothing reaches the state through a
//! global.
//!
//! ## Locking Discipline
//!
//! Each public method takes the lock exactly once and performs one complete,
//! already-consistent transition (or one consistent read). No method calls another
//! method while holding the guard, so the single lock cannot deadlock.
//!
//! A poisoned lock is recovered rather than propagated: every critical section leaves
//! the ledger consistent, so a panic elsewhere never leaves it half-written.
//!
//! ## Invariants
//!
//! - For every provider, `counters[p]` equals the number of active entries tagged `p`
//!   with status `Ongoing`. [`is_consistent`](SharedDeliveryState::is_consistent)
//!   checks this.
//! - A status leaves `Ongoing` exactly once.
//! - An archive record exists only for a `Finished` delivery, and is written in the
//!   same critical section as the status change.
//!
//! ## Archive Keying
//!
//! The archive is keyed by tracking id, not by order name, so two orders with the same
//! name never overwrite each other's record. [`archived_at`](SharedDeliveryState::archived_at)
//! still answers "when did the order called X last complete?".

pub mod error;

pub use error::*;

use crate::model::{
    ActiveEntry, ArchiveRecord, DeliveryStatus, DispatchedOrder, ProviderTag, TrackingId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Default)]
struct DeliveryLedger {
    counters: BTreeMap<ProviderTag, usize>,
    active: HashMap<TrackingId, ActiveEntry>,
    archive: HashMap<TrackingId, ArchiveRecord>,
}

impl DeliveryLedger {
    fn ongoing_for(&self, provider: ProviderTag) -> usize {
        self.active
            .values()
            .filter(|entry| entry.provider == provider && entry.status == DeliveryStatus::Ongoing)
            .count()
    }

    /// Validates and applies `Ongoing -> status`, releasing the provider's counter.
    fn settle(
        &mut self,
        tracking_id: TrackingId,
        provider: ProviderTag,
        status: DeliveryStatus,
    ) -> Result<(), CompletionError> {
        let entry = self
            .active
            .get(&tracking_id)
            .ok_or(CompletionError::UnknownTracking(tracking_id))?;
        if entry.status != DeliveryStatus::Ongoing {
            return Err(CompletionError::AlreadySettled(tracking_id, entry.status));
        }
        if entry.provider != provider {
            return Err(CompletionError::ProviderMismatch {
                tracking_id,
                expected: entry.provider,
                actual: provider,
            });
        }
        let counter = self.counters.entry(provider).or_default();
        if *counter == 0 {
            return Err(CompletionError::CounterUnderflow(provider));
        }

        *counter -= 1;
        if let Some(entry) = self.active.get_mut(&tracking_id) {
            entry.status = status;
        }
        Ok(())
    }
}

/// A consistent copy of the whole state, taken under a single lock acquisition.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub counters: BTreeMap<ProviderTag, usize>,
    pub active: HashMap<TrackingId, ActiveEntry>,
    pub archive: HashMap<TrackingId, ArchiveRecord>,
}

impl StateSnapshot {
    pub fn count_with_status(&self, status: DeliveryStatus) -> usize {
        self.active.values().filter(|e| e.status == status).count()
    }

    pub fn counter(&self, provider: ProviderTag) -> usize {
        self.counters.get(&provider).copied().unwrap_or(0)
    }

    pub fn total_active(&self) -> usize {
        self.counters.values().sum()
    }
}

/// Handle to the shared delivery ledger.
#[derive(Clone, Debug)]
pub struct SharedDeliveryState {
    ledger: Arc<Mutex<DeliveryLedger>>,
}

impl SharedDeliveryState {
    /// Creates an empty state with a zeroed counter for each registered provider.
    pub fn new(providers: impl IntoIterator<Item = ProviderTag>) -> Self {
        let ledger = DeliveryLedger {
            counters: providers.into_iter().map(|p| (p, 0)).collect(),
            ..Default::default()
        };
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeliveryLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a new `Ongoing` delivery and bumps the provider's counter.
    pub fn begin_delivery(&self, order: &DispatchedOrder, provider: ProviderTag, at: Instant) {
        let mut ledger = self.lock();
        ledger.active.insert(
            order.tracking_id,
            ActiveEntry {
                provider,
                status: DeliveryStatus::Ongoing,
                dispatched_at: at,
            },
        );
        *ledger.counters.entry(provider).or_default() += 1;
        trace!(order = %order.name, %provider, tracking_id = %order.tracking_id, "Delivery begun");
    }

    /// Marks the delivery finished, archives it, and releases the provider's counter.
    ///
    /// All three happen together or not at all.
    pub fn finish_delivery(
        &self,
        order: &DispatchedOrder,
        provider: ProviderTag,
        at: Instant,
    ) -> Result<(), CompletionError> {
        let mut ledger = self.lock();
        ledger.settle(order.tracking_id, provider, DeliveryStatus::Finished)?;
        ledger.archive.insert(
            order.tracking_id,
            ArchiveRecord {
                tracking_id: order.tracking_id,
                name: order.name.clone(),
                completed_at: at,
            },
        );
        trace!(order = %order.name, %provider, tracking_id = %order.tracking_id, "Delivery finished");
        Ok(())
    }

    /// Marks a delivery that will never finish and releases the provider's counter.
    pub fn abandon_delivery(
        &self,
        tracking_id: TrackingId,
        provider: ProviderTag,
    ) -> Result<(), CompletionError> {
        self.lock()
            .settle(tracking_id, provider, DeliveryStatus::Abandoned)
    }

    /// Removes every archive record at least `ttl` old.
    ///
    /// With `prune_active`, the matching (finished) active entries are removed too.
    /// Returns the evicted records.
    pub fn evict_expired(&self, ttl: Duration, now: Instant, prune_active: bool) -> Vec<ArchiveRecord> {
        let mut ledger = self.lock();
        let expired: Vec<TrackingId> = ledger
            .archive
            .values()
            .filter(|record| now.saturating_duration_since(record.completed_at) >= ttl)
            .map(|record| record.tracking_id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for tracking_id in expired {
            if let Some(record) = ledger.archive.remove(&tracking_id) {
                if prune_active {
                    ledger.active.remove(&tracking_id);
                }
                evicted.push(record);
            }
        }
        evicted
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let ledger = self.lock();
        StateSnapshot {
            counters: ledger.counters.clone(),
            active: ledger.active.clone(),
            archive: ledger.archive.clone(),
        }
    }

    pub fn active_deliveries(&self, provider: ProviderTag) -> usize {
        self.lock().counters.get(&provider).copied().unwrap_or(0)
    }

    pub fn status(&self, tracking_id: TrackingId) -> Option<DeliveryStatus> {
        self.lock().active.get(&tracking_id).map(|entry| entry.status)
    }

    /// Completion time of the most recent archived delivery named `name`.
    pub fn archived_at(&self, name: &str) -> Option<Instant> {
        self.lock()
            .archive
            .values()
            .filter(|record| record.name == name)
            .map(|record| record.completed_at)
            .max()
    }

    pub fn archive_len(&self) -> usize {
        self.lock().archive.len()
    }

    /// Checks the counter invariant for every provider in one acquisition.
    pub fn is_consistent(&self) -> bool {
        let ledger = self.lock();
        let mut providers: Vec<ProviderTag> = ledger.counters.keys().copied().collect();
        providers.extend(ledger.active.values().map(|entry| entry.provider));
        providers
            .into_iter()
            .all(|p| ledger.counters.get(&p).copied().unwrap_or(0) == ledger.ongoing_for(p))
    }
}
