//! Exponential backoff for forecast requests.
//!
//! Timeouts, connection failures, 5xx, 408 and 429 are retried. Other 4xx
//! answers and malformed requests are returned straight away.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

/// How often and how patiently to retry a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each one after
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, 250, 4000)
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Wait before retry number `retry` (zero based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let doubled = self
            .initial_delay
            .checked_mul(1u32.checked_shl(retry).unwrap_or(u32::MAX))
            .unwrap_or(self.max_delay);
        doubled.min(self.max_delay)
    }
}

/// True for transport failures worth another attempt.
pub fn should_retry_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        true
    } else if error.is_request() {
        false
    } else {
        error.status().is_some_and(should_retry_status)
    }
}

/// True for answers that may succeed if asked again.
pub fn should_retry_status(status: StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT
        )
}

/// Send a request via `send`, retrying per `config`.
///
/// When the retries run out on a retryable status, that last response is
/// returned so the caller can report what the server said.
pub async fn with_retry<F, Fut>(config: RetryConfig, send: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let attempts = config.max_retries + 1;
    let mut retry = 0;
    loop {
        let last_chance = retry == config.max_retries;
        match send().await {
            Ok(response) if last_chance || !should_retry_status(response.status()) => {
                if retry > 0 {
                    tracing::info!(
                        "Forecast request answered {} after {} retries",
                        response.status(),
                        retry
                    );
                }
                return Ok(response);
            }
            Ok(response) => {
                tracing::warn!(
                    "Forecast server answered {} (attempt {}/{})",
                    response.status(),
                    retry + 1,
                    attempts
                );
            }
            Err(e) if last_chance || !should_retry_error(&e) => {
                tracing::debug!("Giving up on forecast request: {}", e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Forecast request failed (attempt {}/{}): {}", retry + 1, attempts, e);
            }
        }

        tokio::time::sleep(config.backoff(retry)).await;
        retry += 1;
    }
}
