use crate::model::TrackingId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tokio::time::Instant;

/// The delivery providers an order can be shipped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    Uklon,
    Uber,
}

impl ProviderTag {
    pub const ALL: [ProviderTag; 2] = [ProviderTag::Uklon, ProviderTag::Uber];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::Uklon => "uklon",
            ProviderTag::Uber => "uber",
        }
    }
}

impl Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one dispatched delivery.
///
/// `Ongoing` moves to exactly one of the other two and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Ongoing,
    Finished,
    /// The completion unit was dropped (panic or forced shutdown) before finishing.
    Abandoned,
}

/// Active-index entry for one tracking id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEntry {
    pub provider: ProviderTag,
    pub status: DeliveryStatus,
    pub dispatched_at: Instant,
}

/// Archive-index entry for one completed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub tracking_id: TrackingId,
    pub name: String,
    pub completed_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_tag_names() {
        assert_eq!(ProviderTag::Uklon.to_string(), "uklon");
        assert_eq!(ProviderTag::Uber.to_string(), "uber");
    }

    #[test]
    fn test_provider_tag_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: ProviderTag,
        }
        let parsed: Wrapper = toml::from_str(r#"provider = "uber""#).unwrap();
        assert_eq!(parsed.provider, ProviderTag::Uber);
    }
}
