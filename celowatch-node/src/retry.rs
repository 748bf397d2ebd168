//! Bounded retry with exponential backoff, composed over a [`TimeSource`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

use crate::constants::{DEFAULT_RETRY_BACKOFF, DEFAULT_RETRY_DELAY_SECS, DEFAULT_RETRY_TRIES};
use crate::error::FetchError;
use crate::time_source::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub tries: u32,
    /// Pause before the first retry
    pub delay: Duration,
    /// Multiplier applied to the pause after each retry
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            tries: DEFAULT_RETRY_TRIES,
            delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Pauses taken between attempts when every attempt fails
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.delay;
        for _ in 1..self.tries.max(1) {
            delays.push(delay);
            delay = delay.mul_f64(self.backoff);
        }
        delays
    }

    /// Total time spent pausing when every attempt of one fetch fails
    pub fn worst_case_backoff(&self) -> Duration {
        self.delays().into_iter().sum()
    }

    /// Run `op` until it succeeds, fails permanently, or runs out of tries
    pub async fn run<T, F, Fut>(&self, url: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let tries = self.tries.max(1);
        let mut delay = self.delay;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= tries => {
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    log::warn!("{}, retrying in {} seconds...", e, delay.as_secs_f64());
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(self.backoff);
                    attempt += 1;
                }
            }
        }
    }
}

/// A [`TimeSource`] that retries transient failures of `inner`
#[derive(Debug, Clone)]
pub struct RetryingTimeSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: TimeSource> RetryingTimeSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<S: TimeSource> TimeSource for RetryingTimeSource<S> {
    async fn fetch(&self, url: &str) -> Result<Option<DateTime<Utc>>, FetchError> {
        self.policy.run(url, || self.inner.fetch(url)).await
    }
}
