//! Validation of client settings.

use crate::{ConfigError, Result};

/// Configuration that can check its own consistency.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Field checks shared by [`Validate`] implementations. Each returns a
/// [`ConfigError::ValidationError`] naming the offending field.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Non-blank string.
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        ensure(!value.trim().is_empty(), field, "cannot be empty")
    }

    /// Non-blank string when present.
    pub fn not_empty_if_set(value: Option<&str>, field: &str) -> Result<()> {
        value.map_or(Ok(()), |v| Self::not_empty(v, field))
    }

    /// Absolute `http://` or `https://` URL.
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        let rest = value
            .strip_prefix("http://")
            .or_else(|| value.strip_prefix("https://"));
        ensure(
            rest.is_some_and(|host| !host.is_empty() && !host.starts_with('/')),
            field,
            &format!("must be an http(s) URL with a host, got {:?}", value),
        )
    }

    /// Non-zero port.
    pub fn is_port(value: u16, field: &str) -> Result<()> {
        ensure(value != 0, field, "must be a non-zero port")
    }

    /// Non-zero duration in milliseconds.
    pub fn positive_millis(value: u64, field: &str) -> Result<()> {
        ensure(value > 0, field, "must be greater than zero")
    }
}

fn ensure(ok: bool, field: &str, problem: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!("{} {}", field, problem)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(ConfigValidator::not_empty("MY-SERVICE", "app_name").is_ok());
        assert!(ConfigValidator::not_empty("", "app_name").is_err());
        assert!(ConfigValidator::not_empty("   ", "app_name").is_err());
        assert!(ConfigValidator::not_empty_if_set(None, "hostname").is_ok());
        assert!(ConfigValidator::not_empty_if_set(Some(""), "hostname").is_err());
    }

    #[test]
    fn test_url() {
        assert!(ConfigValidator::is_url("https://example.com", "eureka_url").is_ok());
        assert!(ConfigValidator::is_url("http://eureka:8080/eureka/v2", "eureka_url").is_ok());
        assert!(ConfigValidator::is_url("eureka:8080", "eureka_url").is_err());
        assert!(ConfigValidator::is_url("http://", "eureka_url").is_err());
        assert!(ConfigValidator::is_url("http:///eureka", "eureka_url").is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = ConfigValidator::is_port(0, "eureka_port").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: eureka_port must be a non-zero port");
        assert!(ConfigValidator::is_port(8080, "eureka_port").is_ok());
    }

    #[test]
    fn test_positive_millis() {
        assert!(ConfigValidator::positive_millis(1, "request_timeout_ms").is_ok());
        assert!(ConfigValidator::positive_millis(0, "request_timeout_ms").is_err());
    }
}
