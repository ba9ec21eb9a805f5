use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::DispatchConfig, ConfigError};

/// Prefix for environment overrides, e.g. `CATERING_POLL_INTERVAL_MS=250` or
/// `CATERING_PROVIDERS__UBER__MAX_LATENCY_MS=8000`.
pub const ENV_PREFIX: &str = "CATERING_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    extract(Some(path))
}

/// Load configuration from defaults plus environment variable overrides only
pub fn load_config_from_env() -> Result<DispatchConfig, ConfigError> {
    extract(None)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<DispatchConfig, ConfigError> {
    let config: DispatchConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

fn extract(path: Option<&Path>) -> Result<DispatchConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(DispatchConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    let config: DispatchConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
