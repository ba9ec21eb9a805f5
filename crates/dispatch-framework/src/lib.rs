//! # Dispatch Framework
//!
//! This crate provides the domain-agnostic building blocks for in-process dispatch
//! systems: producers hand work to a consumer loop, the loop fans work out to short-lived
//! background units, and everything reports what it does as typed events.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into small, independent pieces:
//!
//! 1. **Intake** ([`IntakeQueue`]) - a shared FIFO with a suspending `next()` and
//!    tail `requeue()` for items that are not ready yet
//! 2. **Execution** ([`TaskPool`]) - managed background tasks with explicit
//!    `drain()` / `abort_all()` instead of fire-and-forget spawning
//! 3. **Observability** ([`EventBus`], [`Event`]) - typed events that are logged
//!    through `tracing` and broadcast to subscribers
//! 4. **Lifecycle** ([`shutdown`]) - a level-triggered stop signal for long-lived loops
//!
//! Domain crates combine these with their own state and loops; nothing here knows what
//! an order or a delivery is.
//!
//! ## Example
//!
//! ```rust
//! use dispatch_framework::{IntakeQueue, TaskPool};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = IntakeQueue::new();
//!     let pool = TaskPool::new("jobs");
//!
//!     let consumer = {
//!         let queue = queue.clone();
//!         let pool = pool.clone();
//!         tokio::spawn(async move {
//!             // next() keeps yielding queued jobs after close(), then returns None
//!             while let Some(ms) = queue.next().await {
//!                 pool.spawn(async move {
//!                     tokio::time::sleep(Duration::from_millis(ms)).await;
//!                 });
//!             }
//!         })
//!     };
//!
//!     queue.push(5u64).unwrap();
//!     queue.push(10u64).unwrap();
//!     queue.close();
//!
//!     consumer.await.unwrap();
//!     let report = pool.drain().await;
//!     assert_eq!(report.completed, 2);
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Every component is a cheap, cloneable handle around shared state
//! - Critical sections are short and never held across an `.await`
//! - Poisoned locks are recovered, so a panicking task cannot wedge the others
//!
//! ## Testing
//!
//! The [`mock`] module has helpers for awaiting events and conditions with timeouts.
//! They work on `tokio::time`, so paused-clock tests run instantly.

pub mod error;
pub mod events;
pub mod mock;
pub mod pool;
pub mod queue;
pub mod shutdown;
pub mod tracing;

// Re-export core types for convenience
pub use error::FrameworkError;
pub use events::{Event, EventBus, EventEnvelope};
pub use pool::{PoolReport, TaskPool};
pub use queue::IntakeQueue;
pub use shutdown::{Shutdown, ShutdownTrigger};
