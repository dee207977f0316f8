//! `EUREKA_*` environment variables.

use crate::Result;
use std::collections::HashMap;
use std::env;

/// Prefix used for every client setting read from the environment.
pub const ENV_PREFIX: &str = "EUREKA";

/// Reads prefixed environment variables.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Loader for `<prefix>_*` variables, or every variable without a prefix.
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn eureka() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    /// Load every variable matching the prefix, keyed by the lower-cased
    /// remainder of the name (`EUREKA_APP_NAME` -> `app_name`).
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(strip_prefix(env::vars(), self.prefix.as_deref()))
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::eureka()
    }
}

/// Filter `(name, value)` pairs by prefix and normalize the keys.
pub(crate) fn strip_prefix<I>(vars: I, prefix: Option<&str>) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut config = HashMap::new();

    for (key, value) in vars {
        match prefix {
            Some(prefix) => {
                if let Some(rest) = key.strip_prefix(prefix)
                    && let Some(rest) = rest.strip_prefix('_')
                    && !rest.is_empty()
                {
                    config.insert(rest.to_lowercase(), value);
                }
            }
            None => {
                config.insert(key.to_lowercase(), value);
            }
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix_normalizes_keys() {
        let vars = vec![
            ("EUREKA_APP_NAME".to_string(), "billing".to_string()),
            ("EUREKA_SERVER_PORT".to_string(), "8080".to_string()),
            ("EUREKAX_IGNORED".to_string(), "x".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];

        let map = strip_prefix(vars, Some(ENV_PREFIX));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("app_name").map(String::as_str), Some("billing"));
        assert_eq!(map.get("server_port").map(String::as_str), Some("8080"));
    }

    #[test]
    fn test_strip_prefix_without_prefix() {
        let vars = vec![("FOO".to_string(), "bar".to_string())];
        let map = strip_prefix(vars, None);
        assert_eq!(map.get("foo").map(String::as_str), Some("bar"));
    }
}
