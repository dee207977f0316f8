//! Cloud instance metadata
//!
//! Registrations on Amazon carry a set of EC2 metadata values, and the
//! instance id and availability zone come from the metadata service too.
//! Lookups are best effort: a value that cannot be read is simply absent.

use async_trait::async_trait;
use eureka_http_client::{HttpClient, HttpClientConfig, HttpClientError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Metadata keys attached to Amazon registrations.
pub const AMAZON_METADATA_KEYS: [&str; 10] = [
    "ami-launch-index",
    "local-hostname",
    "availability-zone",
    "instance-id",
    "public-ipv4",
    "public-hostname",
    "ami-manifest-path",
    "local-ipv4",
    "ami-id",
    "instance-type",
];

/// Default base URL of the EC2 instance metadata service.
pub const EC2_METADATA_URL: &str = "http://169.254.169.254/latest/";

const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Source of instance metadata values.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Value of `key`, or `None` when it cannot be read.
    async fn get(&self, key: &str) -> Option<String>;

    /// Read every key in `keys` in one pass, skipping values that are
    /// unavailable.
    async fn get_all(&self, keys: &[&str]) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        for key in keys {
            if let Some(value) = self.get(key).await {
                values.insert(key.to_string(), value);
            }
        }
        values
    }
}

#[async_trait]
impl<T: MetadataProvider + ?Sized> MetadataProvider for Arc<T> {
    async fn get(&self, key: &str) -> Option<String> {
        (**self).get(key).await
    }

    async fn get_all(&self, keys: &[&str]) -> BTreeMap<String, String> {
        (**self).get_all(keys).await
    }
}

/// EC2 instance metadata service client.
///
/// A session token (IMDSv2) is requested once per [`get`] or [`get_all`]
/// call; when that fails the lookups are sent without one.
///
/// [`get`]: MetadataProvider::get
/// [`get_all`]: MetadataProvider::get_all
pub struct Ec2MetadataProvider {
    client: HttpClient,
    base_url: Url,
}

impl Ec2MetadataProvider {
    /// Provider for the link-local metadata endpoint.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_base_url(Url::parse(EC2_METADATA_URL)?)
    }

    /// Provider for a metadata service at `base_url` (the `latest/` level).
    pub fn with_base_url(mut base_url: Url) -> Result<Self, HttpClientError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = HttpClient::new(
            HttpClientConfig::builder()
                .timeout(Duration::from_secs(2))
                .connect_timeout(Duration::from_secs(1))
                .follow_redirects(false)
                .build(),
        )?;

        Ok(Self { client, base_url })
    }

    async fn token(&self) -> Option<String> {
        let url = self.base_url.join("api/token").ok()?;
        let response = self
            .client
            .put(url)
            .header(TOKEN_TTL_HEADER, "21600")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .ok()?;
        Some(response.text()).filter(|token| !token.is_empty())
    }

    async fn fetch(&self, key: &str, token: Option<&str>) -> Result<String, HttpClientError> {
        let url = self.base_url.join("meta-data/")?.join(metadata_path(key))?;

        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }

        Ok(request.send().await?.error_for_status()?.text())
    }

    async fn lookup(&self, key: &str, token: Option<&str>) -> Option<String> {
        match self.fetch(key, token).await {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                debug!(key, error = %e, "Instance metadata unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for Ec2MetadataProvider {
    async fn get(&self, key: &str) -> Option<String> {
        let token = self.token().await;
        self.lookup(key, token.as_deref()).await
    }

    async fn get_all(&self, keys: &[&str]) -> BTreeMap<String, String> {
        let token = self.token().await;
        let mut values = BTreeMap::new();
        for key in keys {
            if let Some(value) = self.lookup(key, token.as_deref()).await {
                values.insert(key.to_string(), value);
            }
        }
        values
    }
}

/// Path of a metadata key below `meta-data/`.
fn metadata_path(key: &str) -> &str {
    match key {
        "availability-zone" => "placement/availability-zone",
        _ => key,
    }
}

/// In-memory metadata.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    values: HashMap<String, String>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl MetadataProvider for StaticMetadata {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Provider without any metadata, used outside Amazon.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

#[async_trait]
impl MetadataProvider for NoMetadata {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_all_skips_missing() {
        let metadata = StaticMetadata::new()
            .with("instance-id", "i-1234")
            .with("local-ipv4", "10.0.0.1");

        let values = metadata.get_all(&AMAZON_METADATA_KEYS).await;
        assert_eq!(values.len(), 2);
        assert_eq!(values["instance-id"], "i-1234");
    }

    #[test]
    fn test_no_metadata() {
        assert!(tokio_test::block_on(NoMetadata.get("instance-id")).is_none());
        assert!(tokio_test::block_on(NoMetadata.get_all(&AMAZON_METADATA_KEYS)).is_empty());
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(metadata_path("availability-zone"), "placement/availability-zone");
        assert_eq!(metadata_path("instance-id"), "instance-id");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let provider =
            Ec2MetadataProvider::with_base_url(Url::parse("http://127.0.0.1:9/latest").unwrap())
                .unwrap();
        assert_eq!(provider.base_url.as_str(), "http://127.0.0.1:9/latest/");
    }
}
