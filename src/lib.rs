// Eureka - A Netflix Eureka registry client for Rust
//
// This library registers service instances with a Eureka cluster, keeps their
// leases alive and queries the registry, failing over across registry servers
// discovered from DNS.

// Re-export the client
pub use eureka_client::*;

// Re-export configuration
pub use eureka_config::{
    ClientConfig, ClientConfigBuilder, ConfigError, DEFAULT_CONTEXT, DataCenter, Discovery,
    Validate,
};

// Re-export discovery
pub use eureka_discovery::{
    DiscoveryError, DnsZoneResolver, StaticZoneResolver, ZoneMap, ZoneResolver, build_server_urls,
};

// Re-export member crates
pub use eureka_config;
pub use eureka_discovery;
pub use eureka_http_client;

/// Prelude for common imports.
///
/// ```
/// use eureka::prelude::*;
/// ```
pub mod prelude {
    pub use eureka_client::{
        EurekaError, InstanceRecord, MetadataProvider, RegistryClient, ServerUrls, Status,
    };
    pub use eureka_config::{ClientConfig, DataCenter};
    pub use eureka_discovery::{ZoneMap, ZoneResolver};
}
