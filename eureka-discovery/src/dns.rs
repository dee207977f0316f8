//! DNS TXT-record zone discovery
//!
//! Registry servers are published in two levels of TXT records:
//!
//! ```text
//! txt.us-east-1.example.com.             TXT "us-east-1a.example.com us-east-1b.example.com"
//! txt.us-east-1a.example.com.            TXT "ec2-1-2-3-4.compute-1.amazonaws.com"
//! txt.us-east-1b.example.com.            TXT "ec2-5-6-7-8.compute-1.amazonaws.com:8080"
//! ```
//!
//! The region record lists one DNS name per zone; the zone is the first
//! label of that name. Each zone record lists `host[:port]` entries.

use crate::zone::{DiscoveryError, ZoneMap, ZoneResolver, zone_name};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::rdata::TXT;
use tracing::debug;

/// Raw TXT lookups.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    /// Return the text of every TXT record at `name`, one entry per record.
    /// A name without TXT records yields an empty list.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DiscoveryError>;
}

#[async_trait]
impl TxtResolver for TokioAsyncResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DiscoveryError> {
        let lookup = match self.txt_lookup(name).await {
            Ok(lookup) => lookup,
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(DiscoveryError::Dns {
                    name: name.to_string(),
                    message: e.to_string(),
                });
            }
        };

        Ok(lookup.iter().map(record_text).collect())
    }
}

/// Text of one TXT record.
///
/// Long values are stored as several character-strings of at most 255
/// bytes, cut without regard to whitespace, so they are joined back
/// together as-is.
fn record_text(txt: &TXT) -> String {
    let data: Vec<u8> = txt
        .txt_data()
        .iter()
        .flat_map(|chunk| chunk.iter())
        .copied()
        .collect();
    String::from_utf8_lossy(&data).into_owned()
}

/// Zone resolver backed by DNS TXT records.
pub struct DnsZoneResolver<R = TokioAsyncResolver> {
    resolver: R,
}

impl DnsZoneResolver {
    /// Resolver using the system DNS configuration (`/etc/resolv.conf`).
    pub fn from_system_conf() -> Result<Self, DiscoveryError> {
        let resolver =
            TokioAsyncResolver::tokio_from_system_conf().map_err(|e| DiscoveryError::Dns {
                name: "system configuration".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(resolver))
    }

    /// Resolver with an explicit upstream configuration.
    pub fn with_config(config: ResolverConfig, options: ResolverOpts) -> Self {
        Self::new(TokioAsyncResolver::tokio(config, options))
    }
}

impl<R: TxtResolver> DnsZoneResolver<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    async fn lookup_entries(&self, name: &str) -> Result<Vec<String>, DiscoveryError> {
        let records = self.resolver.lookup_txt(name).await?;
        Ok(split_entries(&records))
    }
}

#[async_trait]
impl<R: TxtResolver> ZoneResolver for DnsZoneResolver<R> {
    async fn resolve_zones(&self, domain: &str, region: &str) -> Result<ZoneMap, DiscoveryError> {
        let region_name = format!("txt.{}.{}", region, domain);
        let zone_names = self.lookup_entries(&region_name).await?;

        if zone_names.is_empty() {
            return Err(DiscoveryError::NoZones(region_name));
        }

        let mut zones = ZoneMap::new();
        for zone_dns in &zone_names {
            let hosts = self.lookup_entries(&format!("txt.{}", zone_dns)).await?;
            debug!(zone = zone_name(zone_dns), hosts = hosts.len(), "Resolved zone");
            zones.insert(zone_name(zone_dns), hosts);
        }

        Ok(zones)
    }
}

/// Split TXT character strings into whitespace-separated entries.
fn split_entries(records: &[String]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.split_whitespace())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTxt {
        records: HashMap<String, Vec<String>>,
        failing: Option<String>,
        queried: Mutex<Vec<String>>,
    }

    impl FakeTxt {
        fn with(mut self, name: &str, values: &[&str]) -> Self {
            self.records.insert(
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl TxtResolver for FakeTxt {
        async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DiscoveryError> {
            self.queried.lock().unwrap().push(name.to_string());
            if self.failing.as_deref() == Some(name) {
                return Err(DiscoveryError::Dns {
                    name: name.to_string(),
                    message: "timed out".to_string(),
                });
            }
            Ok(self.records.get(name).cloned().unwrap_or_default())
        }
    }

    fn fake() -> FakeTxt {
        FakeTxt::default()
            .with(
                "txt.us-east-1.example.com",
                &["us-east-1a.example.com us-east-1b.example.com"],
            )
            .with("txt.us-east-1a.example.com", &["h1 h2"])
            .with("txt.us-east-1b.example.com", &["h3:8080"])
    }

    #[tokio::test]
    async fn test_resolve_zones() {
        let resolver = DnsZoneResolver::new(fake());

        let zones = resolver.resolve_zones("example.com", "us-east-1").await.unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.hosts("us-east-1a").unwrap(), ["h1", "h2"]);
        assert_eq!(zones.hosts("us-east-1b").unwrap(), ["h3:8080"]);
        assert_eq!(resolver.resolver.queried.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_zones_is_an_error() {
        let resolver = DnsZoneResolver::new(FakeTxt::default());

        let err = resolver.resolve_zones("example.com", "us-east-1").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NoZones(_)));
    }

    #[tokio::test]
    async fn test_zone_lookup_failure_propagates() {
        let mut txt = fake();
        txt.failing = Some("txt.us-east-1b.example.com".to_string());
        let resolver = DnsZoneResolver::new(txt);

        let err = resolver.resolve_zones("example.com", "us-east-1").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Dns { ref name, .. } if name == "txt.us-east-1b.example.com"));
    }

    #[test]
    fn test_record_text_joins_character_strings() {
        let host = "ec2-54-0-0-1.compute-1.amazonaws.com";
        let mut first = "h".repeat(255 - 20);
        first.push(' ');
        first.push_str(&host[..19]);
        assert_eq!(first.len(), 255);
        let txt = TXT::new(vec![first.clone(), format!("{} h2", &host[19..])]);

        let text = record_text(&txt);
        assert_eq!(text, format!("{}{} h2", first, &host[19..]));

        let entries = split_entries(&[text]);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], host);
        assert_eq!(entries[2], "h2");
    }

    #[test]
    fn test_split_entries() {
        let records = vec!["a b".to_string(), "  c\td ".to_string(), String::new()];
        assert_eq!(split_entries(&records), ["a", "b", "c", "d"]);
    }
}
