//! Availability zones and zone resolution

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Zone discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("No availability zones found at {0}")]
    NoZones(String),

    #[error("No registry server instances found in any zone")]
    NoInstances,

    #[error("DNS lookup for {name} failed: {message}")]
    Dns { name: String, message: String },

    #[error("Invalid registry server address {host:?}: {message}")]
    InvalidUrl { host: String, message: String },
}

/// Registry server hosts grouped by availability zone.
///
/// Zone iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMap {
    zones: HashMap<String, Vec<String>>,
}

impl ZoneMap {
    /// Create an empty zone map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add hosts to a zone, appending when the zone already exists.
    pub fn insert<I, S>(&mut self, zone: impl Into<String>, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zones
            .entry(zone.into())
            .or_default()
            .extend(hosts.into_iter().map(Into::into));
    }

    /// Builder-style [`ZoneMap::insert`]
    pub fn with_zone<I, S>(mut self, zone: impl Into<String>, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(zone, hosts);
        self
    }

    /// Zone names
    pub fn zone_names(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    /// Hosts of one zone
    pub fn hosts(&self, zone: &str) -> Option<&[String]> {
        self.zones.get(zone).map(Vec::as_slice)
    }

    pub fn contains_zone(&self, zone: &str) -> bool {
        self.zones.contains_key(zone)
    }

    /// Number of zones
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Total number of hosts across zones
    pub fn host_count(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }

    /// Zone a host belongs to, if any
    pub fn zone_of(&self, host: &str) -> Option<&str> {
        self.zones
            .iter()
            .find(|(_, hosts)| hosts.iter().any(|h| h == host))
            .map(|(zone, _)| zone.as_str())
    }
}

impl<Z, H> FromIterator<(Z, Vec<H>)> for ZoneMap
where
    Z: Into<String>,
    H: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (Z, Vec<H>)>>(iter: T) -> Self {
        let mut map = ZoneMap::new();
        for (zone, hosts) in iter {
            map.insert(zone, hosts);
        }
        map
    }
}

/// Resolves the registry servers of a region, grouped by zone.
#[async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Resolve `domain` / `region` into a zone map. Fails when no zone is
    /// found or any lookup fails; partial results are never returned.
    async fn resolve_zones(&self, domain: &str, region: &str) -> Result<ZoneMap, DiscoveryError>;
}

#[async_trait]
impl<T: ZoneResolver + ?Sized> ZoneResolver for std::sync::Arc<T> {
    async fn resolve_zones(&self, domain: &str, region: &str) -> Result<ZoneMap, DiscoveryError> {
        (**self).resolve_zones(domain, region).await
    }
}

/// Zone name of a per-zone DNS name: its first label.
pub fn zone_name(dns_name: &str) -> &str {
    dns_name.split('.').next().unwrap_or(dns_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_map() {
        let mut zones = ZoneMap::new()
            .with_zone("us-east-1a", ["h1", "h2"])
            .with_zone("us-east-1b", ["h3"]);
        zones.insert("us-east-1b", ["h4"]);

        assert_eq!(zones.len(), 2);
        assert_eq!(zones.host_count(), 4);
        assert_eq!(zones.hosts("us-east-1b").unwrap(), ["h3", "h4"]);
        assert_eq!(zones.zone_of("h2"), Some("us-east-1a"));
        assert!(zones.contains_zone("us-east-1a"));
        assert!(!zones.contains_zone("us-east-1c"));
    }

    #[test]
    fn test_from_iter() {
        let zones: ZoneMap = vec![("us-east-1a", vec!["h1"])].into_iter().collect();
        assert_eq!(zones.hosts("us-east-1a").unwrap(), ["h1"]);
    }

    #[test]
    fn test_zone_name() {
        assert_eq!(zone_name("us-east-1a.eureka.example.com"), "us-east-1a");
        assert_eq!(zone_name("us-east-1a"), "us-east-1a");
    }
}
