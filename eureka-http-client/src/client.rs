//! The transport client.

use http::Method;
use reqwest::Request;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::{HttpClientConfig, HttpClientError, RequestBuilder, Response, Result};

/// Async HTTP client. Every request is attempted exactly once; failover
/// across servers is the caller's concern.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        };

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .redirect(redirect)
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Client with [`HttpClientConfig::default`].
    pub fn default_client() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Timeout of requests that set none themselves.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn get(&self, url: Url) -> RequestBuilder<'_> {
        self.request(Method::GET, url)
    }

    pub fn put(&self, url: Url) -> RequestBuilder<'_> {
        self.request(Method::PUT, url)
    }

    pub fn delete(&self, url: Url) -> RequestBuilder<'_> {
        self.request(Method::DELETE, url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url)
    }

    /// Send `request` and buffer the response body. Transport failures are
    /// classified into timeout / connection / other.
    pub(crate) async fn execute(&self, request: Request) -> Result<Response> {
        let timeout = request.timeout().copied().unwrap_or(self.config.timeout);
        debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self
            .inner
            .execute(request)
            .await
            .map_err(|e| HttpClientError::from_transport(e, timeout))?;

        Response::read(response)
            .await
            .map_err(|e| HttpClientError::from_transport(e, timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client() {
        let client = HttpClient::default_client().unwrap();
        assert!(client.config().gzip);
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_configured_timeout() {
        let client = HttpClient::new(
            HttpClientConfig::builder()
                .timeout(Duration::from_millis(750))
                .build(),
        )
        .unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(750));
    }
}
