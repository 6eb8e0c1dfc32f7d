//! Bounded retries with exponential backoff and jitter.
//!
//! [`RetryingHttpClient`] wraps any [`HttpClient`] so adapters stay unaware of
//! retries. Only retryable transport errors and the statuses listed in
//! [`RetryConfig::retry_on_status`] are retried.

use std::sync::Arc;
use std::time::Duration;

use crate::http_client::{HttpClient, HttpFuture, HttpRequest};

/// Backoff strategy for retrying failed requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed {
        /// Delay between retries.
        delay: Duration,
    },
    /// Uses an exponential delay between retries.
    ///
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
        /// Whether to apply random jitter (+/- 50%) to the delay.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped_seconds = seconds.min(max.as_secs_f64());

                let mut delay = Duration::from_secs_f64(capped_seconds);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let random_offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms =
                        delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Configuration for the automatic retry mechanism.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    /// HTTP status codes that trigger a retry.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    const fn budget(&self) -> u32 {
        if self.enabled {
            self.max_retries
        } else {
            0
        }
    }
}

/// [`HttpClient`] decorator that retries transient failures.
#[derive(Clone)]
pub struct RetryingHttpClient {
    inner: Arc<dyn HttpClient>,
    config: RetryConfig,
}

impl RetryingHttpClient {
    pub fn new(inner: Arc<dyn HttpClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl HttpClient for RetryingHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let budget = self.config.budget();
            let mut attempt = 0;

            loop {
                let outcome = self.inner.execute(request.clone()).await;
                let transient = match &outcome {
                    Ok(response) => self.config.should_retry_status(response.status),
                    Err(error) => error.retryable(),
                };

                if !transient || attempt >= budget {
                    return outcome;
                }

                let delay = self.config.delay_for_attempt(attempt);
                tracing::warn!(
                    url = %request.redacted_url(),
                    attempt = attempt + 1,
                    max_retries = budget,
                    delay_ms = delay.as_millis() as u64,
                    "retrying upstream request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http_client::{HttpError, HttpResponse};

    struct SequenceHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        calls: Mutex<u32>,
    }

    impl SequenceHttpClient {
        fn new(mut responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().expect("lock is not poisoned")
        }
    }

    impl HttpClient for SequenceHttpClient {
        fn execute<'a>(&'a self, _request: HttpRequest) -> HttpFuture<'a> {
            *self.calls.lock().expect("lock is not poisoned") += 1;
            let next = self
                .responses
                .lock()
                .expect("lock is not poisoned")
                .pop()
                .unwrap_or_else(|| Ok(HttpResponse::ok_json("{}")));
            Box::pin(async move { next })
        }
    }

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig::fixed(Duration::from_millis(1), max_retries)
    }

    #[test]
    fn test_fixed_backoff() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(10), Duration::from_millis(100));
    }

    #[test]
    fn test_exponential_backoff() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(4), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_backoff_with_jitter_stays_in_band() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for attempt in 0..5 {
            let expected = (100.0 * 2_f64.powi(attempt as i32)).min(1000.0);
            let delay_ms = backoff.delay(attempt).as_millis() as f64;
            assert!(delay_ms >= expected * 0.49, "attempt={attempt}, delay_ms={delay_ms}");
            assert!(delay_ms <= expected * 1.51, "attempt={attempt}, delay_ms={delay_ms}");
        }
    }

    #[test]
    fn test_default_retry_config() {
        let config = RetryConfig::default();

        assert!(config.enabled);
        assert_eq!(config.max_retries, 2);
        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(400));
        assert!(!config.should_retry_status(404));
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let inner = Arc::new(SequenceHttpClient::new(vec![
            Ok(HttpResponse::with_status(503, "")),
            Ok(HttpResponse::ok_json("{\"ok\":true}")),
        ]));
        let client = RetryingHttpClient::new(inner.clone(), fast_config(2));

        let response = client
            .execute(HttpRequest::get("https://x.test"))
            .await
            .expect("second attempt succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let inner = Arc::new(SequenceHttpClient::new(vec![
            Err(HttpError::new("reset")),
            Err(HttpError::new("reset")),
            Err(HttpError::new("reset")),
            Ok(HttpResponse::ok_json("{}")),
        ]));
        let client = RetryingHttpClient::new(inner.clone(), fast_config(2));

        let error = client
            .execute(HttpRequest::get("https://x.test"))
            .await
            .expect_err("budget exhausted");

        assert_eq!(error.message(), "reset");
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let inner = Arc::new(SequenceHttpClient::new(vec![
            Ok(HttpResponse::with_status(404, "")),
            Ok(HttpResponse::ok_json("{}")),
        ]));
        let client = RetryingHttpClient::new(inner.clone(), fast_config(2));

        let response = client
            .execute(HttpRequest::get("https://x.test"))
            .await
            .expect("response is returned");

        assert_eq!(response.status, 404);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn disabled_config_makes_single_attempt() {
        let inner = Arc::new(SequenceHttpClient::new(vec![Err(HttpError::new("down"))]));
        let client = RetryingHttpClient::new(inner.clone(), RetryConfig::no_retry());

        assert!(client.execute(HttpRequest::get("https://x.test")).await.is_err());
        assert_eq!(inner.calls(), 1);
    }
}
