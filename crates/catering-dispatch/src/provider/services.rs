//! The concrete delivery providers.
//!
//! Both share the whole shipping routine from [`DeliveryService`]; they differ only in
//! their tag and the latency range they sample from.

use super::DeliveryService;
use crate::config::LatencyConfig;
use crate::model::ProviderTag;

/// Fast provider: 1–3 s by default.
#[derive(Debug, Clone)]
pub struct Uklon {
    latency: LatencyConfig,
}

impl Uklon {
    pub fn new(latency: LatencyConfig) -> Self {
        Self { latency }
    }
}

impl Default for Uklon {
    fn default() -> Self {
        Self::new(LatencyConfig::new(1_000, 3_000))
    }
}

impl DeliveryService for Uklon {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Uklon
    }

    fn latency(&self) -> LatencyConfig {
        self.latency
    }
}

/// Slow provider: 3–5 s by default.
#[derive(Debug, Clone)]
pub struct Uber {
    latency: LatencyConfig,
}

impl Uber {
    pub fn new(latency: LatencyConfig) -> Self {
        Self { latency }
    }
}

impl Default for Uber {
    fn default() -> Self {
        Self::new(LatencyConfig::new(3_000, 5_000))
    }
}

impl DeliveryService for Uber {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Uber
    }

    fn latency(&self) -> LatencyConfig {
        self.latency
    }
}
