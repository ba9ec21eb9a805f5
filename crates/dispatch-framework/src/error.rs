//! # Framework Errors
//!
//! This module defines the common error types used throughout the dispatch framework.
//! By centralizing error definitions, every queue, pool and loop built on top of the
//! framework reports failures the same way.

/// Errors that can occur within the framework itself.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Queue closed")]
    QueueClosed,
    #[error("Task failed: {0}")]
    TaskFailed(String),
}
