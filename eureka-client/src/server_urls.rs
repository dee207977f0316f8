//! Registry server URL list.

use crate::error::Result;
use crate::metadata::MetadataProvider;
use eureka_config::{ClientConfig, Discovery};
use eureka_discovery::{DiscoveryError, ZoneResolver, build_server_urls};
use std::fmt;
use tracing::{debug, warn};

/// Non-empty, ordered list of registry base URLs. The first entry is the
/// primary server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrls {
    urls: Vec<String>,
}

impl ServerUrls {
    /// Wrap an ordered list. Fails when `urls` is empty.
    pub fn new<I, S>(urls: I) -> std::result::Result<Self, DiscoveryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        if urls.is_empty() {
            return Err(DiscoveryError::NoInstances);
        }
        Ok(Self { urls })
    }

    /// A single server.
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
        }
    }

    pub fn primary(&self) -> &str {
        &self.urls[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// A server list is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a ServerUrls {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

impl fmt::Display for ServerUrls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.urls.join(", "))
    }
}

/// Resolve the server list for `config`.
///
/// A static `eureka_url` is used as-is without touching `resolver`.
/// Otherwise the zones of the region are resolved and ordered, preferring
/// the instance's zone when `prefer_same_zone` is set.
pub async fn resolve_server_urls(
    config: &ClientConfig,
    resolver: Option<&dyn ZoneResolver>,
    metadata: &dyn MetadataProvider,
) -> Result<ServerUrls> {
    let (domain, region) = match config.discovery()? {
        Discovery::Static { url } => {
            debug!(url, "Using static registry server");
            return Ok(ServerUrls::single(url));
        }
        Discovery::Dns { domain, region } => (domain, region),
    };

    let resolver = resolver.ok_or_else(|| DiscoveryError::Dns {
        name: format!("txt.{}.{}", region, domain),
        message: "no zone resolver configured".to_string(),
    })?;
    let zones = resolver.resolve_zones(domain, region).await?;

    let preferred_zone = if config.prefer_same_zone {
        let zone = instance_zone(config, metadata).await;
        if zone.is_none() {
            warn!("Instance zone unknown; registry servers will not be zone-ordered");
        }
        zone
    } else {
        None
    };

    let urls = build_server_urls(
        &zones,
        preferred_zone.as_deref(),
        &config.context,
        config.eureka_port,
    )?;
    Ok(ServerUrls::new(urls)?)
}

/// Availability zone of the local instance: the configured zone, else the
/// `availability-zone` metadata value.
pub async fn instance_zone(config: &ClientConfig, metadata: &dyn MetadataProvider) -> Option<String> {
    match &config.availability_zone {
        Some(zone) => Some(zone.clone()),
        None => metadata.get("availability-zone").await,
    }
}
