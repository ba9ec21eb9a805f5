//! # Catering Dispatch
//!
//! An order-dispatch scheduler. Orders are submitted with a delay, wait in an intake
//! queue until they are ready, get handed to a randomly chosen delivery provider, and
//! complete asynchronously after a provider-specific latency. Completed orders are
//! archived and evicted after a time-to-live.
//!
//! ## Components
//!
//! - **[clients]**: [`OrderClient`](clients::OrderClient), the submission handle.
//! - **[dispatcher]**: the readiness-gated [`DispatchLoop`](dispatcher::DispatchLoop)
//!   and provider selection.
//! - **[provider]**: the [`DeliveryService`](provider::DeliveryService) variants and
//!   the lease each completion unit holds.
//! - **[state]**: [`SharedDeliveryState`](state::SharedDeliveryState), counters plus
//!   active and archive indices behind one lock.
//! - **[archive]**: the periodic [`ArchiveSweeper`](archive::ArchiveSweeper).
//! - **[lifecycle]**: [`DispatchSystem`](lifecycle::DispatchSystem), which wires and
//!   stops everything.
//!
//! ## Testing
//!
//! Everything time-based goes through `tokio::time`, so the whole system runs under
//! `#[tokio::test(start_paused = true)]`. See [`dispatch_framework::mock`] for the
//! event helpers the tests use.

pub mod archive;
pub mod clients;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod input;
pub mod lifecycle;
pub mod model;
pub mod provider;
pub mod state;
