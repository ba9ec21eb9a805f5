use super::ConfigError;
use crate::model::ProviderTag;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Top-level configuration for the dispatch system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Pause after requeueing an order that is not ready yet (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Period of the archive sweep (milliseconds).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_ms: u64,

    /// Minimum age before an archive record is evicted (milliseconds).
    /// Defaults to the sweep interval.
    #[serde(default)]
    pub archive_ttl_ms: Option<u64>,

    /// Wait for in-flight deliveries at shutdown instead of abandoning them.
    #[serde(default = "default_true")]
    pub drain_on_shutdown: bool,

    /// Drop a finished active entry when its archive record is evicted.
    #[serde(default)]
    pub prune_on_evict: bool,

    /// Seed for provider selection and latency sampling. Random when unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// How many events a slow subscriber may fall behind before lagging.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Per-provider latency ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_uklon")]
    pub uklon: LatencyConfig,

    #[serde(default = "default_uber")]
    pub uber: LatencyConfig,
}

/// Inclusive latency range a provider samples from uniformly (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl LatencyConfig {
    pub fn new(min_latency_ms: u64, max_latency_ms: u64) -> Self {
        Self {
            min_latency_ms,
            max_latency_ms,
        }
    }

    pub fn range_ms(&self) -> RangeInclusive<u64> {
        self.min_latency_ms..=self.max_latency_ms
    }
}

fn default_poll_interval() -> u64 {
    500
}

fn default_sweep_interval() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_event_buffer() -> usize {
    1024
}

fn default_uklon() -> LatencyConfig {
    LatencyConfig::new(1_000, 3_000)
}

fn default_uber() -> LatencyConfig {
    LatencyConfig::new(3_000, 5_000)
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            uklon: default_uklon(),
            uber: default_uber(),
        }
    }
}

impl ProvidersConfig {
    pub fn latency(&self, provider: ProviderTag) -> LatencyConfig {
        match provider {
            ProviderTag::Uklon => self.uklon,
            ProviderTag::Uber => self.uber,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            sweep_interval_ms: default_sweep_interval(),
            archive_ttl_ms: None,
            drain_on_shutdown: true,
            prune_on_evict: false,
            rng_seed: None,
            event_buffer: default_event_buffer(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl DispatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn archive_ttl(&self) -> Duration {
        Duration::from_millis(self.archive_ttl_ms.unwrap_or(self.sweep_interval_ms))
    }

    /// Rejects values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid("sweep_interval_ms must be > 0".into()));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid("event_buffer must be > 0".into()));
        }
        for provider in ProviderTag::ALL {
            let latency = self.providers.latency(provider);
            if latency.min_latency_ms > latency.max_latency_ms {
                return Err(ConfigError::Invalid(format!(
                    "providers.{provider}: min_latency_ms ({}) exceeds max_latency_ms ({})",
                    latency.min_latency_ms, latency.max_latency_ms
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.sweep_interval(), Duration::from_secs(10));
        assert_eq!(config.archive_ttl(), Duration::from_secs(10));
        assert!(config.drain_on_shutdown);
        assert!(!config.prune_on_evict);
        assert_eq!(config.providers.uklon.range_ms(), 1_000..=3_000);
        assert_eq!(config.providers.uber.range_ms(), 3_000..=5_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: DispatchConfig = toml::from_str("poll_interval_ms = 100").unwrap();
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.sweep_interval_ms, 10_000);
        assert_eq!(config.providers, ProvidersConfig::default());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            poll_interval_ms = 250
            sweep_interval_ms = 4000
            archive_ttl_ms = 8000
            drain_on_shutdown = false
            prune_on_evict = true
            rng_seed = 42
            event_buffer = 64

            [providers.uklon]
            min_latency_ms = 10
            max_latency_ms = 20

            [providers.uber]
            min_latency_ms = 30
            max_latency_ms = 40
        "#;
        let config: DispatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.archive_ttl(), Duration::from_secs(8));
        assert!(!config.drain_on_shutdown);
        assert!(config.prune_on_evict);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.providers.latency(ProviderTag::Uber).range_ms(), 30..=40);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = DispatchConfig::default();
        config.providers.uber = LatencyConfig::new(5, 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let config = DispatchConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DispatchConfig {
            event_buffer: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
