//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for the whole process with the
//! `tracing` crate.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`), keeping log lines short while still showing structured
//! fields such as `order`, `provider` and `tracking_id`.
//!
//! Levels come from the `RUST_LOG` environment variable:
//!
//! ```bash
//! # Lifecycle events: queued, ready, shipping, delivered, evicted
//! RUST_LOG=info cargo run
//!
//! # Also requeues, sweep passes and pool bookkeeping
//! RUST_LOG=debug cargo run
//!
//! # Filter to one crate
//! RUST_LOG=catering_dispatch=debug cargo run
//! ```
//!
//! ## Output
//!
//! ```text
//! INFO Order queued order="A" delay_ms=0
//! INFO Order ready order="A"
//! INFO Shipping started order="A" provider=uklon latency_ms=2000
//! INFO Delivered order="A" provider=uklon tracking_id=0b6f...
//! INFO Archive evicted order="A"
//! ```

/// Installs the global `fmt` subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
