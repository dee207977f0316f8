//! Zone-aware ordering of registry server URLs
//!
//! The first URL of the result is the primary target: the first host of
//! the preferred zone when that zone was discovered, otherwise the first
//! host encountered. Every other URL follows in random order so that
//! fallback traffic spreads across replicas.

use crate::zone::{DiscoveryError, ZoneMap};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, warn};
use url::Url;

/// Order the servers of `zones` into base URLs.
///
/// `port` is applied to hosts that carry no port of their own.
pub fn build_server_urls(
    zones: &ZoneMap,
    preferred_zone: Option<&str>,
    context: &str,
    port: Option<u16>,
) -> Result<Vec<String>, DiscoveryError> {
    build_server_urls_with_rng(zones, preferred_zone, context, port, &mut rand::rng())
}

/// [`build_server_urls`] with a caller-supplied random source.
pub fn build_server_urls_with_rng<R: Rng + ?Sized>(
    zones: &ZoneMap,
    preferred_zone: Option<&str>,
    context: &str,
    port: Option<u16>,
    rng: &mut R,
) -> Result<Vec<String>, DiscoveryError> {
    let mut order: Vec<&str> = zones.zone_names().collect();

    if let Some(preferred) = preferred_zone {
        match order.iter().position(|zone| *zone == preferred) {
            Some(index) => {
                let zone = order.remove(index);
                order.insert(0, zone);
            }
            None => {
                warn!(
                    zone = preferred,
                    available = ?order,
                    "Preferred zone not among discovered zones"
                );
            }
        }
    }

    let mut urls = Vec::with_capacity(zones.host_count());
    for zone in order {
        let mut hosts: Vec<&String> = zones.hosts(zone).unwrap_or_default().iter().collect();
        hosts.shuffle(rng);
        for host in hosts {
            urls.push(base_url(host, context, port)?);
        }
    }

    if urls.is_empty() {
        return Err(DiscoveryError::NoInstances);
    }

    let primary = urls.remove(0);
    urls.shuffle(rng);
    urls.insert(0, primary);

    info!(urls = ?urls, "Registry server ordering");
    Ok(urls)
}

/// Base URL `http://<host>[:<port>]/<context>/` for one server.
///
/// The result always ends with exactly one `/`, whatever slashes `context`
/// carries. Hosts with a path, query or credentials are rejected.
pub fn base_url(host: &str, context: &str, port: Option<u16>) -> Result<String, DiscoveryError> {
    let invalid = |message: &str| DiscoveryError::InvalidUrl {
        host: host.to_string(),
        message: message.to_string(),
    };

    let host = host.trim();
    if host.is_empty() {
        return Err(invalid("empty host"));
    }

    let mut url =
        Url::parse(&format!("http://{}/", host)).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().is_none()
        || url.path() != "/"
        || url.query().is_some()
        || !url.username().is_empty()
    {
        return Err(invalid("expected host[:port]"));
    }

    // `url.port()` hides default ports, so look at the raw host.
    let has_port = host.rsplit(']').next().is_some_and(|tail| tail.contains(':'));
    if let Some(port) = port
        && !has_port
    {
        url.set_port(Some(port))
            .map_err(|_| invalid("cannot carry a port"))?;
    }

    let segments: Vec<&str> = context.split('/').filter(|s| !s.is_empty()).collect();
    if !segments.is_empty() {
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL"))?
            .clear()
            .extend(&segments)
            .push("");
    }

    Ok(url.into())
}
