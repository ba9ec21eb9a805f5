//! # System Lifecycle
//!
//! [`DispatchSystem`] owns the wiring. It builds the shared pieces once and hands each
//! long-lived task a clone of what it needs:
//!
//! | Piece | Held by |
//! |-------|---------|
//! | intake queue | [`OrderClient`](crate::clients::OrderClient), dispatch loop |
//! | delivery state | providers (via the ship context), completion units, sweeper |
//! | task pool | providers spawn completion units onto it |
//! | event bus | everyone who announces something |
//! | shutdown signal | dispatch loop, sweeper |
//!
//! ## Shutdown
//!
//! 1. Fire the shutdown signal and close the intake queue. New submissions fail with
//!    `QueueClosed`.
//! 2. Await the dispatch loop and the sweeper.
//! 3. Count the orders that never became ready.
//! 4. Drain the task pool (every in-flight delivery finishes) or abort it (every
//!    in-flight delivery is marked `Abandoned`), per `drain_on_shutdown`.
//!
//! Either way the counters end consistent with the active index.

pub mod dispatch_system;

pub use dispatch_system::*;
