//! Configuration: typed settings with serde defaults, loaded from TOML plus
//! `CATERING_`-prefixed environment overrides.

mod loader;
mod types;

pub use loader::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
