//! Registry server discovery for Eureka clients
//!
//! This crate locates the Eureka servers a client should talk to and puts
//! them in the order the client should try them.
//!
//! ## Features
//!
//! - **Zone Resolution** - Read per-zone server lists from DNS TXT records
//! - **Zone Preference** - Servers of the instance's own zone go first
//! - **Randomized Fallback** - Remaining servers are shuffled per resolution
//! - **Static Topologies** - In-memory resolver for tests and fixed setups
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eureka_discovery::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = DnsZoneResolver::from_system_conf()?;
//!     let zones = resolver.resolve_zones("example.com", "us-east-1").await?;
//!
//!     let urls = build_server_urls(&zones, Some("us-east-1a"), "eureka/v2", Some(8080))?;
//!     for url in urls {
//!         println!("Registry server: {}", url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod dns;
pub mod ordering;
pub mod static_resolver;
pub mod zone;

pub use dns::{DnsZoneResolver, TxtResolver};
pub use ordering::{base_url, build_server_urls, build_server_urls_with_rng};
pub use static_resolver::StaticZoneResolver;
pub use zone::{DiscoveryError, ZoneMap, ZoneResolver, zone_name};
