//! Instance records
//!
//! [`InstanceRecord`] is both the registration payload and the instance view
//! returned by registry queries. Its JSON form follows the Eureka REST API:
//!
//! ```json
//! {
//!   "instanceId": "i-1234",
//!   "hostName": "ec2-1-2-3-4.compute-1.amazonaws.com",
//!   "app": "MY-SERVICE",
//!   "ipAddr": "10.0.0.1",
//!   "status": "UP",
//!   "port": {"$": 8080, "@enabled": "true"},
//!   "securePort": {"$": 8443, "@enabled": "false"},
//!   "dataCenterInfo": {"@class": "com.netflix.appinfo.AmazonInfo", "name": "Amazon"}
//! }
//! ```

use crate::metadata::{AMAZON_METADATA_KEYS, MetadataProvider};
use crate::status::Status;
use eureka_config::{ClientConfig, DataCenter};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// `@class` of Amazon datacenter info.
pub const AMAZON_INFO_CLASS: &str = "com.netflix.appinfo.AmazonInfo";

/// `@class` of non-Amazon datacenter info.
pub const DEFAULT_INFO_CLASS: &str = "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo";

/// Port advertised when none is configured.
pub const DEFAULT_PORT: u16 = 7001;

/// Secure port advertised when none is configured.
pub const DEFAULT_SECURE_PORT: u16 = 7002;

/// Metadata keys the local identity is resolved from.
const IDENTITY_KEYS: [&str; 4] = ["public-hostname", "local-hostname", "local-ipv4", "instance-id"];

/// A registered service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub host_name: String,
    pub app: String,
    pub ip_addr: String,
    pub vip_address: String,
    pub secure_vip_address: String,
    pub status: Status,
    #[serde(rename = "overriddenstatus", skip_serializing_if = "Option::is_none")]
    pub overridden_status: Option<Status>,
    pub port: PortInfo,
    pub secure_port: PortInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_url: Option<String>,
    pub data_center_info: DataCenterInfo,
    /// Application-defined metadata.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Default for InstanceRecord {
    fn default() -> Self {
        Self {
            instance_id: String::new(),
            host_name: String::new(),
            app: String::new(),
            ip_addr: String::new(),
            vip_address: String::new(),
            secure_vip_address: String::new(),
            status: Status::Unknown,
            overridden_status: None,
            port: PortInfo::default(),
            secure_port: PortInfo::default(),
            home_page_url: None,
            status_page_url: None,
            health_check_url: None,
            data_center_info: DataCenterInfo::default(),
            metadata: BTreeMap::new(),
        }
    }
}

impl InstanceRecord {
    /// Build the registration record of the local instance.
    ///
    /// On Amazon the instance metadata is read once per call.
    pub async fn local(
        config: &ClientConfig,
        metadata: &dyn MetadataProvider,
        status: Status,
    ) -> Self {
        let amazon_metadata = match config.datacenter {
            DataCenter::Amazon => Some(metadata.get_all(&AMAZON_METADATA_KEYS).await),
            DataCenter::MyOwn => None,
        };
        let identity = Identity::from_metadata(config, amazon_metadata.as_ref());

        let data_center_info = match amazon_metadata {
            Some(values) => DataCenterInfo {
                class: AMAZON_INFO_CLASS.to_string(),
                name: DataCenter::Amazon.as_str().to_string(),
                metadata: values,
            },
            None => DataCenterInfo::default(),
        };

        let vip_address = config
            .vip_address
            .clone()
            .unwrap_or_else(|| identity.hostname.clone());
        let secure_vip_address = config
            .secure_vip_address
            .clone()
            .unwrap_or_else(|| identity.hostname.clone());

        Self {
            instance_id: identity.instance_id,
            host_name: identity.hostname,
            app: config.app_name.clone(),
            ip_addr: identity.ip_addr,
            vip_address,
            secure_vip_address,
            status,
            overridden_status: None,
            port: PortInfo::new(config.port.unwrap_or(DEFAULT_PORT), true),
            secure_port: PortInfo::new(
                config.secure_port.unwrap_or(DEFAULT_SECURE_PORT),
                config.secure_port.is_some(),
            ),
            home_page_url: config.homepage_url.clone(),
            status_page_url: config.status_page_url.clone(),
            health_check_url: config.health_check_url.clone(),
            data_center_info,
            metadata: BTreeMap::new(),
        }
    }
}

/// Host identity of the local instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub hostname: String,
    pub ip_addr: String,
    pub instance_id: String,
}

impl Identity {
    /// Resolve the identity from configuration, falling back to instance
    /// metadata on Amazon.
    ///
    /// The instance id is the EC2 instance id on Amazon, otherwise
    /// `<hostname>:<app>:<port>` (`<hostname>:<app>` without a port).
    pub async fn resolve(config: &ClientConfig, metadata: &dyn MetadataProvider) -> Self {
        let values = if config.datacenter.is_amazon() {
            Some(metadata.get_all(&IDENTITY_KEYS).await)
        } else {
            None
        };
        Self::from_metadata(config, values.as_ref())
    }

    /// Resolve the identity from configuration and metadata values that
    /// were already read. `None` means the instance is not on Amazon.
    pub fn from_metadata(config: &ClientConfig, metadata: Option<&BTreeMap<String, String>>) -> Self {
        let value = |key: &str| metadata.and_then(|values| values.get(key)).cloned();

        let ip_addr = config.ip_addr.clone().or_else(|| value("local-ipv4"));
        let hostname = config
            .hostname
            .clone()
            .or_else(|| value("public-hostname"))
            .or_else(|| value("local-hostname"))
            .or_else(|| ip_addr.clone())
            .unwrap_or_else(|| "localhost".to_string());
        let ip_addr = ip_addr.unwrap_or_else(|| hostname.clone());

        let instance_id = value("instance-id").unwrap_or_else(|| match config.port {
            Some(port) => format!("{}:{}:{}", hostname, config.app_name, port),
            None => format!("{}:{}", hostname, config.app_name),
        });

        Self {
            hostname,
            ip_addr,
            instance_id,
        }
    }
}

/// Port entry in Eureka's `{"$": 8080, "@enabled": "true"}` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortInfo {
    #[serde(rename = "$", deserialize_with = "port_number")]
    pub port: u16,
    #[serde(
        rename = "@enabled",
        serialize_with = "enabled_flag",
        deserialize_with = "parse_enabled_flag",
        default
    )]
    pub enabled: bool,
}

impl PortInfo {
    pub fn new(port: u16, enabled: bool) -> Self {
        Self { port, enabled }
    }
}

/// Datacenter description of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCenterInfo {
    #[serde(rename = "@class", default)]
    pub class: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Default for DataCenterInfo {
    fn default() -> Self {
        Self {
            class: DEFAULT_INFO_CLASS.to_string(),
            name: DataCenter::MyOwn.as_str().to_string(),
            metadata: BTreeMap::new(),
        }
    }
}

impl DataCenterInfo {
    pub fn is_amazon(&self) -> bool {
        self.name == DataCenter::Amazon.as_str()
    }
}

fn port_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| de::Error::custom(format!("port out of range: {}", n))),
        Value::String(s) => s.trim().parse().map_err(de::Error::custom),
        other => Err(de::Error::custom(format!("invalid port: {}", other))),
    }
}

fn enabled_flag<S: Serializer>(enabled: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *enabled { "true" } else { "false" })
}

fn parse_enabled_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        other => Err(de::Error::custom(format!("invalid @enabled flag: {}", other))),
    }
}
