// Configuration for the Eureka registry client

pub mod client_config;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use client_config::{ClientConfig, ClientConfigBuilder, DEFAULT_CONTEXT, DataCenter, Discovery};
pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};
