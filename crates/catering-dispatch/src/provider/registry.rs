use super::{DeliveryService, Uber, Uklon};
use crate::config::ProvidersConfig;
use crate::error::DispatchError;
use crate::model::ProviderTag;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// The set of providers an order can be dispatched to.
#[derive(Clone, Debug)]
pub struct ProviderRegistry {
    services: Vec<Arc<dyn DeliveryService>>,
}

impl ProviderRegistry {
    pub fn new(services: Vec<Arc<dyn DeliveryService>>) -> Result<Self, DispatchError> {
        if services.is_empty() {
            return Err(DispatchError::NoProviders);
        }
        Ok(Self { services })
    }

    /// Uklon and Uber with the configured latency ranges.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            services: services(config),
        }
    }

    /// Unweighted uniform choice over the registered providers.
    pub fn select(&self, rng: &mut StdRng) -> Option<Arc<dyn DeliveryService>> {
        self.services.choose(rng).cloned()
    }

    pub fn get(&self, tag: ProviderTag) -> Option<Arc<dyn DeliveryService>> {
        self.services.iter().find(|s| s.tag() == tag).cloned()
    }

    pub fn tags(&self) -> Vec<ProviderTag> {
        self.services.iter().map(|s| s.tag()).collect()
    }
}

/// One service per known provider, with its configured latency range.
pub fn services(config: &ProvidersConfig) -> Vec<Arc<dyn DeliveryService>> {
    vec![
        Arc::new(Uklon::new(config.uklon)),
        Arc::new(Uber::new(config.uber)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_empty_registry_is_rejected() {
        assert_eq!(
            ProviderRegistry::new(Vec::new()).unwrap_err(),
            DispatchError::NoProviders
        );
    }

    #[test]
    fn test_configured_services_build_a_registry() {
        let config = ProvidersConfig::default();
        let registry = ProviderRegistry::new(services(&config)).unwrap();
        assert_eq!(registry.tags(), ProviderTag::ALL.to_vec());
        assert_eq!(
            registry.get(ProviderTag::Uklon).map(|s| s.latency()),
            Some(config.uklon)
        );
    }

    #[test]
    fn test_from_config_registers_both() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default());
        assert_eq!(registry.tags(), vec![ProviderTag::Uklon, ProviderTag::Uber]);
        assert_eq!(
            registry.get(ProviderTag::Uber).map(|s| s.latency().range_ms()),
            Some(3_000..=5_000)
        );
    }

    #[test]
    fn test_selection_is_roughly_uniform() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let mut picks: HashMap<ProviderTag, usize> = HashMap::new();
        for _ in 0..2_000 {
            let service = registry.select(&mut rng).unwrap();
            *picks.entry(service.tag()).or_default() += 1;
        }
        for tag in ProviderTag::ALL {
            let count = picks.get(&tag).copied().unwrap_or(0);
            assert!((800..=1_200).contains(&count), "{tag} picked {count} times");
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default());
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let left = registry.select(&mut a).map(|s| s.tag());
            let right = registry.select(&mut b).map(|s| s.tag());
            assert_eq!(left, right);
        }
    }
}
