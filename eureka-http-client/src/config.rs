//! Transport settings.

use std::time::Duration;

/// Settings of an [`HttpClient`](crate::HttpClient).
///
/// `timeout` bounds a whole exchange (connect, send, read the body) and can
/// be overridden per request with
/// [`RequestBuilder::timeout`](crate::RequestBuilder::timeout).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Headers sent with every request.
    pub default_headers: Vec<(String, String)>,
    pub user_agent: String,
    /// Advertise and transparently decode gzip bodies.
    pub gzip: bool,
    /// Follow up to ten redirects; off means 3xx responses are returned.
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: Vec::new(),
            user_agent: format!("eureka-http-client/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            follow_redirects: true,
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`].
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Send `name: value` with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.gzip);
        assert!(config.follow_redirects);
        assert!(config.user_agent.starts_with("eureka-http-client/"));
    }

    #[test]
    fn test_builder() {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_millis(500))
            .default_header("X-Trace", "1")
            .gzip(false)
            .follow_redirects(false)
            .build();

        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.default_headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert!(!config.gzip);
        assert!(!config.follow_redirects);
    }
}
