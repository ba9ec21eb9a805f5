//! Error type for the dispatch system's public API.

use crate::config::ConfigError;
use dispatch_framework::FrameworkError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    /// The queue or a background task failed.
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested delay is longer than any order may wait.
    #[error("Delay {0:?} exceeds the maximum of one year")]
    DelayOutOfRange(Duration),

    /// No delivery provider is registered to ship with.
    #[error("No delivery providers registered")]
    NoProviders,
}
