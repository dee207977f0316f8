//! Eureka client configuration.
//!
//! A [`ClientConfig`] describes the local instance (name, addresses, ports,
//! status URLs) and how registry servers are located: either a single static
//! `eureka_url`, or DNS TXT discovery driven by `eureka_domain_name` and
//! `region`. One of the two is required.
//!
//! Settings can come from the builder, from `EUREKA_*` environment variables,
//! or from a JSON / TOML / `.env` file.

use crate::env::strip_prefix;
use crate::{ConfigError, ConfigLoader, ConfigValidator, EnvLoader, FileFormat, Result, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default context path of the Eureka REST API.
pub const DEFAULT_CONTEXT: &str = "eureka/v2";

/// Kind of datacenter the instance runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataCenter {
    /// Amazon EC2; instance metadata is read from the metadata service.
    #[default]
    #[serde(alias = "AWS")]
    Amazon,
    /// Self-managed hosts.
    MyOwn,
}

impl DataCenter {
    /// Name as sent in `dataCenterInfo.name`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataCenter::Amazon => "Amazon",
            DataCenter::MyOwn => "MyOwn",
        }
    }

    pub fn is_amazon(&self) -> bool {
        matches!(self, DataCenter::Amazon)
    }
}

impl FromStr for DataCenter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "amazon" | "aws" => Ok(DataCenter::Amazon),
            "myown" => Ok(DataCenter::MyOwn),
            _ => Err(ConfigError::InvalidValue {
                key: "datacenter".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DataCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How registry servers are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery<'a> {
    /// A single configured server URL; no DNS lookups.
    Static { url: &'a str },
    /// TXT-record discovery under `txt.<region>.<domain>`.
    Dns { domain: &'a str, region: &'a str },
}

/// Immutable client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Application name registered with Eureka.
    pub app_name: String,
    /// Context path of the REST API on each server.
    pub context: String,
    /// Datacenter kind.
    pub datacenter: DataCenter,
    /// Static server URL; takes precedence over DNS discovery.
    pub eureka_url: Option<String>,
    /// Domain holding the discovery TXT records.
    pub eureka_domain_name: Option<String>,
    /// Port of DNS-discovered servers.
    pub eureka_port: Option<u16>,
    /// Region used in the top-level TXT lookup.
    pub region: Option<String>,
    /// Put servers from the instance's own zone first.
    pub prefer_same_zone: bool,
    /// Zone of this instance; read from instance metadata when unset.
    pub availability_zone: Option<String>,
    pub hostname: Option<String>,
    pub ip_addr: Option<String>,
    pub port: Option<u16>,
    pub secure_port: Option<u16>,
    pub health_check_url: Option<String>,
    pub homepage_url: Option<String>,
    pub status_page_url: Option<String>,
    pub vip_address: Option<String>,
    pub secure_vip_address: Option<String>,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// Upper bound for one pass over all servers, in milliseconds.
    pub failover_deadline_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            context: DEFAULT_CONTEXT.to_string(),
            datacenter: DataCenter::default(),
            eureka_url: None,
            eureka_domain_name: None,
            eureka_port: None,
            region: None,
            prefer_same_zone: true,
            availability_zone: None,
            hostname: None,
            ip_addr: None,
            port: None,
            secure_port: None,
            health_check_url: None,
            homepage_url: None,
            status_page_url: None,
            vip_address: None,
            secure_vip_address: None,
            request_timeout_ms: None,
            failover_deadline_ms: None,
        }
    }
}

impl ClientConfig {
    /// Create a builder for the given application.
    pub fn builder(app_name: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(app_name)
    }

    /// Load and validate configuration from `EUREKA_*` environment variables.
    ///
    /// | variable                      | field                  |
    /// |-------------------------------|------------------------|
    /// | `EUREKA_APP_NAME`             | `app_name`             |
    /// | `EUREKA_CONTEXT`              | `context`              |
    /// | `EUREKA_DATACENTER`           | `datacenter`           |
    /// | `EUREKA_URL`                  | `eureka_url`           |
    /// | `EUREKA_DOMAIN_NAME`          | `eureka_domain_name`   |
    /// | `EUREKA_SERVER_PORT`          | `eureka_port`          |
    /// | `EUREKA_REGION`               | `region`               |
    /// | `EUREKA_PREFER_SAME_ZONE`     | `prefer_same_zone`     |
    /// | `EUREKA_AVAILABILITY_ZONE`    | `availability_zone`    |
    /// | `EUREKA_HOSTNAME`             | `hostname`             |
    /// | `EUREKA_IP_ADDR`              | `ip_addr`              |
    /// | `EUREKA_INSTANCE_PORT`        | `port`                 |
    /// | `EUREKA_SECURE_PORT`          | `secure_port`          |
    /// | `EUREKA_HEALTH_CHECK_URL`     | `health_check_url`     |
    /// | `EUREKA_HOMEPAGE_URL`         | `homepage_url`         |
    /// | `EUREKA_STATUS_PAGE_URL`      | `status_page_url`      |
    /// | `EUREKA_VIP_ADDRESS`          | `vip_address`          |
    /// | `EUREKA_SECURE_VIP_ADDRESS`   | `secure_vip_address`   |
    /// | `EUREKA_REQUEST_TIMEOUT_MS`   | `request_timeout_ms`   |
    /// | `EUREKA_FAILOVER_DEADLINE_MS` | `failover_deadline_ms` |
    pub fn from_env() -> Result<Self> {
        let vars = EnvLoader::eureka().load()?;
        Self::from_map(&vars)
    }

    /// Load a `.env` file into the process environment, then read it.
    pub fn from_dotenv(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    /// Load and validate configuration from a JSON, TOML or `.env` file.
    ///
    /// JSON and TOML files use the field names of this struct; `.env` files
    /// use the `EUREKA_*` names of [`ClientConfig::from_env`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let loader = ConfigLoader::auto(path.as_ref())?;
        let value = loader.load_file(path.as_ref())?;

        if loader.format() == FileFormat::Env {
            let pairs = match value {
                serde_json::Value::Object(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            };
            return Self::from_map(&strip_prefix(pairs, Some(crate::env::ENV_PREFIX)));
        }

        let config: ClientConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build from already-normalized `EUREKA_*` keys (`app_name`,
    /// `server_port`, ...), as produced by [`EnvLoader::load`].
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = ClientConfig {
            app_name: vars.get("app_name").cloned().unwrap_or_default(),
            ..ClientConfig::default()
        };

        if let Some(context) = text(vars, "context") {
            config.context = context;
        }
        if let Some(datacenter) = text(vars, "datacenter") {
            config.datacenter = datacenter.parse()?;
        }
        if let Some(flag) = parse_flag(vars, "prefer_same_zone")? {
            config.prefer_same_zone = flag;
        }
        config.eureka_url = text(vars, "url");
        config.eureka_domain_name = text(vars, "domain_name");
        config.eureka_port = parse_var(vars, "server_port")?;
        config.region = text(vars, "region");
        config.availability_zone = text(vars, "availability_zone");
        config.hostname = text(vars, "hostname");
        config.ip_addr = text(vars, "ip_addr");
        config.port = parse_var(vars, "instance_port")?;
        config.secure_port = parse_var(vars, "secure_port")?;
        config.health_check_url = text(vars, "health_check_url");
        config.homepage_url = text(vars, "homepage_url");
        config.status_page_url = text(vars, "status_page_url");
        config.vip_address = text(vars, "vip_address");
        config.secure_vip_address = text(vars, "secure_vip_address");
        config.request_timeout_ms = parse_var(vars, "request_timeout_ms")?;
        config.failover_deadline_ms = parse_var(vars, "failover_deadline_ms")?;

        config.validate()?;
        Ok(config)
    }

    /// How registry servers are located. Fails when neither a static URL
    /// nor complete DNS parameters are configured.
    pub fn discovery(&self) -> Result<Discovery<'_>> {
        if let Some(url) = non_blank(self.eureka_url.as_deref()) {
            ConfigValidator::is_url(url, "eureka_url")?;
            return Ok(Discovery::Static { url });
        }

        match (
            non_blank(self.eureka_domain_name.as_deref()),
            non_blank(self.region.as_deref()),
        ) {
            (Some(domain), Some(region)) => Ok(Discovery::Dns { domain, region }),
            (Some(_), None) => Err(ConfigError::ValidationError(
                "region is required for DNS discovery".to_string(),
            )),
            _ => Err(ConfigError::ValidationError(
                "eureka_url must be set, or eureka_domain_name and region for DNS discovery"
                    .to_string(),
            )),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn failover_deadline(&self) -> Option<Duration> {
        self.failover_deadline_ms.map(Duration::from_millis)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.app_name, "app_name")?;
        ConfigValidator::not_empty(&self.context, "context")?;
        self.discovery()?;

        for (port, field) in [
            (self.eureka_port, "eureka_port"),
            (self.port, "port"),
            (self.secure_port, "secure_port"),
        ] {
            if let Some(port) = port {
                ConfigValidator::is_port(port, field)?;
            }
        }

        ConfigValidator::not_empty_if_set(self.hostname.as_deref(), "hostname")?;
        ConfigValidator::not_empty_if_set(self.availability_zone.as_deref(), "availability_zone")?;

        if let Some(ms) = self.request_timeout_ms {
            ConfigValidator::positive_millis(ms, "request_timeout_ms")?;
        }
        if let Some(ms) = self.failover_deadline_ms {
            ConfigValidator::positive_millis(ms, "failover_deadline_ms")?;
        }

        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    fn new(app_name: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                app_name: app_name.into(),
                ..ClientConfig::default()
            },
        }
    }

    /// Set the REST context path (default `eureka/v2`).
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.config.context = context.into();
        self
    }

    pub fn datacenter(mut self, datacenter: DataCenter) -> Self {
        self.config.datacenter = datacenter;
        self
    }

    /// Use a single static server URL.
    pub fn eureka_url(mut self, url: impl Into<String>) -> Self {
        self.config.eureka_url = Some(url.into());
        self
    }

    /// Discover servers from TXT records under `domain` for `region`.
    pub fn dns(mut self, domain: impl Into<String>, region: impl Into<String>) -> Self {
        self.config.eureka_domain_name = Some(domain.into());
        self.config.region = Some(region.into());
        self
    }

    /// Port of DNS-discovered servers.
    pub fn eureka_port(mut self, port: u16) -> Self {
        self.config.eureka_port = Some(port);
        self
    }

    pub fn prefer_same_zone(mut self, enabled: bool) -> Self {
        self.config.prefer_same_zone = enabled;
        self
    }

    pub fn availability_zone(mut self, zone: impl Into<String>) -> Self {
        self.config.availability_zone = Some(zone.into());
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = Some(hostname.into());
        self
    }

    pub fn ip_addr(mut self, ip_addr: impl Into<String>) -> Self {
        self.config.ip_addr = Some(ip_addr.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    pub fn secure_port(mut self, port: u16) -> Self {
        self.config.secure_port = Some(port);
        self
    }

    pub fn health_check_url(mut self, url: impl Into<String>) -> Self {
        self.config.health_check_url = Some(url.into());
        self
    }

    pub fn homepage_url(mut self, url: impl Into<String>) -> Self {
        self.config.homepage_url = Some(url.into());
        self
    }

    pub fn status_page_url(mut self, url: impl Into<String>) -> Self {
        self.config.status_page_url = Some(url.into());
        self
    }

    pub fn vip_address(mut self, vip: impl Into<String>) -> Self {
        self.config.vip_address = Some(vip.into());
        self
    }

    pub fn secure_vip_address(mut self, vip: impl Into<String>) -> Self {
        self.config.secure_vip_address = Some(vip.into());
        self
    }

    /// Per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    /// Overall deadline for one pass over all servers.
    pub fn failover_deadline(mut self, deadline: Duration) -> Self {
        self.config.failover_deadline_ms = Some(saturating_millis(deadline));
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn text(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    non_blank(vars.get(key).map(String::as_str)).map(str::to_string)
}

fn parse_var<T: FromStr>(vars: &HashMap<String, String>, key: &str) -> Result<Option<T>> {
    vars.get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
            })
        })
        .transpose()
}

fn parse_flag(vars: &HashMap<String, String>, key: &str) -> Result<Option<bool>> {
    vars.get(key)
        .map(|raw| match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
            }),
        })
        .transpose()
}
