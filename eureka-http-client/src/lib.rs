//! # Eureka HTTP Client
//!
//! Thin async HTTP transport used by the Eureka registry client.
//!
//! ## Features
//!
//! - **Single attempt**: each request is sent once; failover across
//!   registry servers happens one level up
//! - **Timeouts**: per-client default and per-request override
//! - **Compression**: gzip responses are accepted and decoded
//! - **Typed errors**: timeouts, connection failures and non-2xx statuses
//!   are distinguishable
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eureka_http_client::{HttpClient, HttpClientConfig, Url};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default())?;
//!
//!     let response = client
//!         .get(Url::parse("http://eureka:8080/eureka/v2/apps")?)
//!         .accept_json()
//!         .send()
//!         .await?
//!         .error_for_status()?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;

// Re-export common types
pub use http::{Method, StatusCode, header};
pub use url::Url;
