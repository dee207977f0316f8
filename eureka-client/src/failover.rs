//! Sequential failover across registry servers.
//!
//! Every registry operation runs through [`failover`]: the servers are tried
//! one after another in list order, the first success is returned, and the
//! operation fails only once every server has failed. Nothing is retried
//! and no two requests are in flight at once.

use crate::error::EurekaError;
use crate::server_urls::ServerUrls;
use eureka_http_client::HttpClientError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Registry operation kinds, for logging and error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Register,
    UpdateStatus,
    Heartbeat,
    Deregister,
    Fetch,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Register => "register",
            Operation::UpdateStatus => "update_status",
            Operation::Heartbeat => "heartbeat",
            Operation::Deregister => "deregister",
            Operation::Fetch => "fetch",
        }
    }

    fn failed(self, attempts: usize, source: HttpClientError) -> EurekaError {
        match self {
            Operation::Register => EurekaError::RegistrationFailed { attempts, source },
            Operation::UpdateStatus => EurekaError::UpdateFailed { attempts, source },
            Operation::Heartbeat => EurekaError::HeartbeatFailed { attempts, source },
            Operation::Deregister => EurekaError::DeregistrationFailed { attempts, source },
            Operation::Fetch => EurekaError::FetchFailed { attempts, source },
        }
    }
}

/// Timing limits of one failover pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailoverPolicy {
    /// Per-request timeout; the HTTP client default applies when unset.
    pub request_timeout: Option<Duration>,
    /// No new attempt is started once this much time has passed.
    pub deadline: Option<Duration>,
}

impl FailoverPolicy {
    /// Timeout for an attempt started `elapsed` into the pass. `None` once
    /// the deadline has passed.
    fn attempt_timeout(&self, elapsed: Duration) -> Option<Option<Duration>> {
        match self.deadline {
            None => Some(self.request_timeout),
            Some(deadline) if elapsed >= deadline => None,
            Some(deadline) => {
                let remaining = deadline - elapsed;
                Some(Some(
                    self.request_timeout
                        .map_or(remaining, |timeout| timeout.min(remaining)),
                ))
            }
        }
    }
}

/// Run `attempt` against each server until one succeeds.
///
/// `attempt` gets the base URL and the timeout to apply to its request.
pub(crate) async fn failover<'a, T, F, Fut>(
    urls: &'a ServerUrls,
    policy: FailoverPolicy,
    operation: Operation,
    mut attempt: F,
) -> Result<T, EurekaError>
where
    F: FnMut(&'a str, Option<Duration>) -> Fut,
    Fut: Future<Output = Result<T, HttpClientError>>,
{
    let started = Instant::now();
    let mut attempts = 0;
    let mut last_error = None;

    for base in urls.iter() {
        let elapsed = started.elapsed();
        let timeout = match policy.attempt_timeout(elapsed) {
            Some(timeout) => timeout,
            None if attempts > 0 => {
                warn!(
                    operation = operation.name(),
                    attempts,
                    elapsed = ?elapsed,
                    "Failover deadline reached"
                );
                break;
            }
            None => policy.request_timeout,
        };

        attempts += 1;
        match attempt(base, timeout).await {
            Ok(value) => {
                debug!(operation = operation.name(), url = base, attempts, "Registry request succeeded");
                return Ok(value);
            }
            Err(e) => {
                warn!(operation = operation.name(), url = base, error = %e, "Registry request failed");
                last_error = Some(e);
            }
        }
    }

    let source = last_error.unwrap_or_else(|| HttpClientError::Timeout(policy.deadline.unwrap_or_default()));
    Err(operation.failed(attempts, source))
}

/// Endpoint URL: `base` with `segments` appended as path segments.
///
/// Works with and without a trailing `/` on `base`; segments are
/// percent-encoded.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, HttpClientError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| HttpClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn urls() -> ServerUrls {
        ServerUrls::new(["http://h1/eureka/v2/", "http://h2/eureka/v2/", "http://h3/eureka/v2/"]).unwrap()
    }

    fn unavailable() -> HttpClientError {
        HttpClientError::Response {
            status: 503,
            message: "Service Unavailable".to_string(),
        }
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("http://eureka:8080/eureka/v2", &["apps", "MY-SERVICE"]).unwrap().as_str(),
            "http://eureka:8080/eureka/v2/apps/MY-SERVICE"
        );
        assert_eq!(
            endpoint("http://h1:8080/eureka/v2/", &["apps", "MY-SERVICE", "host:app:80", "status"])
                .unwrap()
                .as_str(),
            "http://h1:8080/eureka/v2/apps/MY-SERVICE/host:app:80/status"
        );
        assert_eq!(endpoint("http://h1/", &["apps"]).unwrap().as_str(), "http://h1/apps");
        assert_eq!(
            endpoint("http://h1/", &["vips", "a b/c"]).unwrap().as_str(),
            "http://h1/vips/a%20b%2Fc"
        );
        assert!(endpoint("not a url", &["apps"]).is_err());
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let urls = urls();
        let seen = RefCell::new(Vec::new());

        let result = failover(&urls, FailoverPolicy::default(), Operation::Register, |base, _| {
            seen.borrow_mut().push(base);
            async move {
                if base.contains("h1") {
                    Err(unavailable())
                } else {
                    Ok(base.to_string())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "http://h2/eureka/v2/");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_error() {
        let err = failover(&urls(), FailoverPolicy::default(), Operation::Heartbeat, |base, _| async move {
            if base.contains("h3") {
                Err::<(), _>(HttpClientError::Connection("refused".to_string()))
            } else {
                Err(unavailable())
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, EurekaError::HeartbeatFailed { attempts: 3, .. }));
        assert!(err.last_error().unwrap().is_connection());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_before_next_attempt() {
        let policy = FailoverPolicy {
            request_timeout: None,
            deadline: Some(Duration::from_secs(5)),
        };

        let err = failover(&urls(), policy, Operation::Fetch, |_, timeout| async move {
            assert!(timeout.is_some_and(|t| t <= Duration::from_secs(5)));
            tokio::time::sleep(Duration::from_secs(3)).await;
            Err::<(), _>(unavailable())
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts(), Some(2));
    }

    #[test]
    fn test_attempt_timeout() {
        let policy = FailoverPolicy {
            request_timeout: Some(Duration::from_secs(2)),
            deadline: Some(Duration::from_secs(5)),
        };

        assert_eq!(policy.attempt_timeout(Duration::ZERO), Some(Some(Duration::from_secs(2))));
        assert_eq!(policy.attempt_timeout(Duration::from_secs(4)), Some(Some(Duration::from_secs(1))));
        assert_eq!(policy.attempt_timeout(Duration::from_secs(5)), None);
        assert_eq!(FailoverPolicy::default().attempt_timeout(Duration::from_secs(60)), Some(None));
    }
}
