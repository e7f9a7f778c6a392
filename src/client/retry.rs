//! Retry with exponential backoff for idempotent GETs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::error::{EtlError, EtlResult};

/// How transient failures are retried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per request, the first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Statuses that are retried instead of returned
    #[serde(default = "default_retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_retryable_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            retryable_statuses: default_retryable_statuses(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Whether a status should be retried
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Delay to wait after the given failed attempt (1-based)
    ///
    /// A server `Retry-After` wins over the computed backoff as long as it
    /// stays within `max_backoff_ms`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let cap = Duration::from_millis(self.max_backoff_ms);
        if let Some(hint) = retry_after {
            if hint <= cap {
                return hint;
            }
        }

        let exponent = attempt.saturating_sub(1).min(31);
        let millis = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Check the policy is usable
    pub fn validate(&self) -> EtlResult<()> {
        if self.max_attempts == 0 {
            return Err(EtlError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Waits between attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Transport decorator that retries transient failures
pub struct RetryingTransport<T, S = ThreadSleeper> {
    inner: T,
    policy: RetryPolicy,
    sleeper: S,
}

impl<T: HttpTransport> RetryingTransport<T, ThreadSleeper> {
    /// Wrap a transport, sleeping the current thread between attempts
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, ThreadSleeper)
    }
}

impl<T: HttpTransport, S: Sleeper> RetryingTransport<T, S> {
    /// Wrap a transport with a custom sleeper
    pub fn with_sleeper(inner: T, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

}

impl<T: HttpTransport, S: Sleeper> HttpTransport for RetryingTransport<T, S> {
    fn get(&self, request: &ApiRequest) -> EtlResult<ApiResponse> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let (last_status, retry_after, last_error) = match self.inner.get(request) {
                Ok(response) if self.policy.is_retryable(response.status) => {
                    (Some(response.status), response.retry_after, None)
                }
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() => {
                    debug!(endpoint = %request.endpoint, error = %err, "transport error");
                    (None, None, Some(err.to_string()))
                }
                Err(err) => return Err(err),
            };

            if attempt >= max_attempts {
                warn!(
                    endpoint = %request.endpoint,
                    attempts = attempt,
                    status = ?last_status,
                    error = ?last_error,
                    "retry budget exhausted"
                );
                return Err(EtlError::TransientFetchFailure {
                    status: last_status,
                    attempts: attempt,
                    last_error,
                });
            }

            let delay = self.policy.delay_for(attempt, retry_after);
            warn!(
                endpoint = %request.endpoint,
                attempt,
                status = ?last_status,
                delay_ms = delay.as_millis() as u64,
                "transient failure, retrying"
            );
            self.sleeper.sleep(delay);
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeTransport, RecordingSleeper};
    use std::cell::Cell;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            backoff_base_ms: 100,
            max_backoff_ms: 1000,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = fast_policy();
        assert_eq!(policy.delay_for(1, None), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2, None), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3, None), Duration::from_millis(400));
        assert_eq!(policy.delay_for(5, None), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(60, None), Duration::from_millis(1000));
    }

    #[test]
    fn test_retry_after_hint() {
        let policy = fast_policy();
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_millis(700))),
            Duration::from_millis(700)
        );
        // Hints beyond the cap fall back to the computed delay
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(60))),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_recovers_after_two_503s() {
        let calls = Cell::new(0);
        let fake = FakeTransport::new(move |_| {
            calls.set(calls.get() + 1);
            if calls.get() <= 2 {
                Ok(ApiResponse::new(503, "unavailable"))
            } else {
                Ok(ApiResponse::new(200, "ok"))
            }
        });
        let sleeper = RecordingSleeper::default();
        let transport = RetryingTransport::with_sleeper(&fake, fast_policy(), &sleeper);

        let response = transport.get(&ApiRequest::new("libro_mayor")).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "ok");
        assert_eq!(fake.request_count(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn test_exhausted_budget_is_transient_failure() {
        let fake = FakeTransport::new(|_| Ok(ApiResponse::new(500, "boom")));
        let sleeper = RecordingSleeper::default();
        let transport = RetryingTransport::with_sleeper(&fake, fast_policy(), &sleeper);

        let err = transport.get(&ApiRequest::new("libro_mayor")).unwrap_err();

        assert!(matches!(
            err,
            EtlError::TransientFetchFailure {
                status: Some(500),
                attempts: 4,
                last_error: None
            }
        ));
        assert_eq!(fake.request_count(), 4);
        assert_eq!(sleeper.delays().len(), 3);
    }

    #[test]
    fn test_non_retryable_status_returned_immediately() {
        let fake = FakeTransport::new(|_| Ok(ApiResponse::new(401, "denied")));
        let sleeper = RecordingSleeper::default();
        let transport = RetryingTransport::with_sleeper(&fake, fast_policy(), &sleeper);

        let response = transport.get(&ApiRequest::new("plan_cuenta")).unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(fake.request_count(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[test]
    fn test_transport_errors_are_retried() {
        let calls = Cell::new(0);
        let fake = FakeTransport::new(move |_| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(EtlError::Http("connection reset".into()))
            } else {
                Ok(ApiResponse::new(200, "ok"))
            }
        });
        let sleeper = RecordingSleeper::default();
        let transport = RetryingTransport::with_sleeper(&fake, fast_policy(), &sleeper);

        assert_eq!(transport.get(&ApiRequest::new("x")).unwrap().status, 200);
        assert_eq!(fake.request_count(), 2);
    }

    #[test]
    fn test_no_retry_policy() {
        let fake = FakeTransport::new(|_| Err(EtlError::Http("timeout".into())));
        let sleeper = RecordingSleeper::default();
        let transport = RetryingTransport::with_sleeper(&fake, RetryPolicy::no_retry(), &sleeper);

        let err = transport.get(&ApiRequest::new("x")).unwrap_err();
        match err {
            EtlError::TransientFetchFailure {
                status: None,
                attempts: 1,
                last_error: Some(cause),
            } => assert!(cause.contains("timeout")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_attempts_invalid() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(policy.validate().is_err());
    }
}
