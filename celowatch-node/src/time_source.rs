//! Remote "last activity" timestamps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;

use celowatch_observer::{Probe, Signal};

use crate::constants::HTTP_REQUEST_TIMEOUT_SECS;
use crate::error::FetchError;
use crate::scrape;

/// Something that can report when activity was last seen at an endpoint
#[async_trait]
pub trait TimeSource: Send + Sync {
    /// `Ok(None)` means the endpoint answered but had no activity to report.
    async fn fetch(&self, url: &str) -> Result<Option<DateTime<Utc>>, FetchError>;
}

#[async_trait]
impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Option<DateTime<Utc>>, FetchError> {
        (**self).fetch(url).await
    }
}

/// Single-attempt HTTP fetch of a Blockscout page
#[derive(Debug, Clone)]
pub struct HttpTimeSource {
    client: Client,
}

impl HttpTimeSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TimeSource for HttpTimeSource {
    async fn fetch(&self, url: &str) -> Result<Option<DateTime<Utc>>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let res = self.client.get(url).send().await.map_err(transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = res.bytes().await.map_err(transport)?;
        let timestamp = scrape::extract_timestamp(&body);
        log::debug!("Fetched {} ({} bytes): {:?}", url, body.len(), timestamp);
        Ok(timestamp)
    }
}

/// The two explorer pages polled every tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub validator_url: String,
    pub chain_url: String,
    host: String,
}

impl Endpoints {
    pub fn new(explorer_url: &str, validator_address: &str) -> anyhow::Result<Self> {
        let base = explorer_url.trim_end_matches('/');
        let host = Url::parse(base)?
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Explorer URL has no host: {}", explorer_url))?;

        Ok(Self {
            validator_url: format!("{}/address/{}/validations?type=JSON", base, validator_address),
            chain_url: format!("{}/blocks?type=JSON", base),
            host,
        })
    }

    /// Host name of the explorer, used in "cannot probe" messages
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Fetch both signals concurrently; neither failure blocks the other
pub async fn probe_signals<T: TimeSource + ?Sized>(source: &T, endpoints: &Endpoints) -> (Probe, Probe) {
    let (validator, chain) = tokio::join!(
        source.fetch(&endpoints.validator_url),
        source.fetch(&endpoints.chain_url),
    );
    let fetched_at = Utc::now();
    (
        Probe::from(validator.map(|ts| Signal::new(ts, fetched_at))),
        Probe::from(chain.map(|ts| Signal::new(ts, fetched_at))),
    )
}
