//! Registry client errors.

use eureka_config::ConfigError;
use eureka_discovery::DiscoveryError;
use eureka_http_client::HttpClientError;
use thiserror::Error;

/// Result type for registry client operations.
pub type Result<T> = std::result::Result<T, EurekaError>;

/// Registry client errors.
///
/// The operation variants are returned once every server URL has been
/// tried; they carry the number of attempts and the error of the last one.
#[derive(Debug, Error)]
pub enum EurekaError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Registry server resolution failed: {0}")]
    Resolution(#[from] DiscoveryError),

    #[error("Registration failed after {attempts} attempt(s): {source}")]
    RegistrationFailed {
        attempts: usize,
        #[source]
        source: HttpClientError,
    },

    #[error("Status update failed after {attempts} attempt(s): {source}")]
    UpdateFailed {
        attempts: usize,
        #[source]
        source: HttpClientError,
    },

    #[error("Heartbeat failed after {attempts} attempt(s): {source}")]
    HeartbeatFailed {
        attempts: usize,
        #[source]
        source: HttpClientError,
    },

    #[error("Deregistration failed after {attempts} attempt(s): {source}")]
    DeregistrationFailed {
        attempts: usize,
        #[source]
        source: HttpClientError,
    },

    #[error("Registry query failed after {attempts} attempt(s): {source}")]
    FetchFailed {
        attempts: usize,
        #[source]
        source: HttpClientError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpClientError),
}

impl EurekaError {
    /// Number of servers tried before giving up.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::RegistrationFailed { attempts, .. }
            | Self::UpdateFailed { attempts, .. }
            | Self::HeartbeatFailed { attempts, .. }
            | Self::DeregistrationFailed { attempts, .. }
            | Self::FetchFailed { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Error of the last server attempt.
    pub fn last_error(&self) -> Option<&HttpClientError> {
        match self {
            Self::RegistrationFailed { source, .. }
            | Self::UpdateFailed { source, .. }
            | Self::HeartbeatFailed { source, .. }
            | Self::DeregistrationFailed { source, .. }
            | Self::FetchFailed { source, .. } => Some(source),
            Self::Http(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
