//! In-memory zone resolver (for testing and fixed topologies)

use crate::zone::{DiscoveryError, ZoneMap, ZoneResolver};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Zone resolver answering from a fixed [`ZoneMap`].
///
/// Clones share the lookup counter, so a clone handed to a client can be
/// inspected afterwards.
#[derive(Clone, Default)]
pub struct StaticZoneResolver {
    zones: ZoneMap,
    lookups: Arc<AtomicUsize>,
}

impl StaticZoneResolver {
    /// Create a resolver with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver answering with `zones`
    pub fn from_zones(zones: ZoneMap) -> Self {
        Self {
            zones,
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a zone
    pub fn with_zone<I, S>(mut self, zone: impl Into<String>, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zones.insert(zone, hosts);
        self
    }

    /// Number of resolutions performed so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneResolver for StaticZoneResolver {
    async fn resolve_zones(&self, domain: &str, region: &str) -> Result<ZoneMap, DiscoveryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.zones.is_empty() {
            return Err(DiscoveryError::NoZones(format!("txt.{}.{}", region, domain)));
        }
        Ok(self.zones.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticZoneResolver::new()
            .with_zone("us-east-1a", ["h1", "h2"])
            .with_zone("us-east-1b", ["h3"]);
        let handle = resolver.clone();

        let zones = resolver.resolve_zones("example.com", "us-east-1").await.unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(handle.lookups(), 1);
    }

    #[test]
    fn test_empty_resolver_has_no_zones() {
        let resolver = StaticZoneResolver::new();

        let result = tokio_test::block_on(resolver.resolve_zones("example.com", "us-east-1"));
        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, DiscoveryError::NoZones(ref name) if name == "txt.us-east-1.example.com"));
    }
}
