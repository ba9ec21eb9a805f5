//! # Clients
//!
//! Thin handles the outside world uses to talk to a running dispatch system.

pub mod order_client;

pub use order_client::OrderClient;
