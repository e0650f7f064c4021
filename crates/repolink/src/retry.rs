//! Retry policy for upstream reads.
//!
//! Transient failures are retried with exponential backoff plus jitter,
//! bounded by a total attempt count. Which errors count as transient is the
//! caller's decision.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

/// Default total attempts for one upstream request (first try included).
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 500;

/// Upper bound on a single backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 8_000;

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Minimum delay between attempts.
    pub min_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Total number of attempts, including the first one.
    pub max_attempts: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_attempts: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_attempts,
            with_jitter: true,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.retries());

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying while `is_transient` holds and attempts remain.
///
/// Returns the operation's output together with the number of attempts made;
/// on failure the last error is returned alongside the attempt count.
pub async fn with_retry<T, E, F, Fut, P>(
    mut operation: F,
    config: &RetryConfig,
    is_transient: P,
    label: &str,
) -> Result<(T, usize), (E, usize)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let attempt = AtomicUsize::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    let result = retry_op
        .retry(config.clone().into_backoff())
        .notify(|err, dur| {
            tracing::warn!(
                target: "repolink::retry",
                %label,
                attempt = attempt.load(Ordering::SeqCst),
                max_attempts = config.max_attempts,
                delay_ms = dur.as_millis() as u64,
                error = %err,
                "transient failure, retrying"
            );
        })
        .when(|e| is_transient(e))
        .await;

    let attempts = attempt.load(Ordering::SeqCst);
    result.map(|v| (v, attempts)).map_err(|e| (e, attempts))
}
