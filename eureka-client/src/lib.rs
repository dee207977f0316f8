//! Eureka registry client
//!
//! Registers a service instance with a Netflix Eureka cluster, keeps its
//! lease alive, and queries the registry. Registry servers are either a
//! single configured URL or discovered through DNS TXT records, ordered so
//! that servers of the instance's own availability zone are tried first.
//!
//! ## Features
//!
//! - **Registration** - Register, update status, heartbeat and deregister
//! - **Queries** - Applications, VIP / secure VIP lookups, single instances
//! - **Failover** - Every operation walks the server list until one succeeds
//! - **EC2 Metadata** - Instance id, zone and addresses read on Amazon
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eureka_client::{RegistryClient, Status};
//! use eureka_config::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder("my-service")
//!         .dns("eureka.example.com", "us-east-1")
//!         .eureka_port(8080)
//!         .port(8080)
//!         .build()?;
//!
//!     let client = RegistryClient::new(config).await?;
//!     client.register_default().await?;
//!     client.update_status(Status::Up).await?;
//!
//!     loop {
//!         tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//!         client.heartbeat().await?;
//!     }
//! }
//! ```

pub mod applications;
pub mod client;
pub mod error;
mod failover;
pub mod instance;
pub mod metadata;
pub mod server_urls;
pub mod status;

pub use applications::{Application, Applications};
pub use client::{DEFAULT_REQUEST_TIMEOUT, RegistryClient, RegistryClientBuilder};
pub use error::{EurekaError, Result};
pub use failover::FailoverPolicy;
pub use instance::{DataCenterInfo, Identity, InstanceRecord, PortInfo};
pub use metadata::{
    AMAZON_METADATA_KEYS, Ec2MetadataProvider, MetadataProvider, NoMetadata, StaticMetadata,
};
pub use server_urls::{ServerUrls, resolve_server_urls};
pub use status::{ParseStatusError, Status};
