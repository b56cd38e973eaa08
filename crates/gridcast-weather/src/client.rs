//! Background forecast and alert fetches against the NWS API.
//!
//! These calls run inside the refresh loop, so transient failures are not
//! surfaced: a transport error, or a payload missing its expected top-level
//! key, logs and retries after a fixed delay. A location record missing the
//! keys a fetch needs short-circuits to `Ok(None)` instead of erroring -
//! the poller has no one to report to.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use gridcast_core::LocationConfig;

use crate::error::FetchError;
use crate::grid::NWS_URL;
use crate::types::{AlertsPayload, ForecastPayload};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "gridcast/0.1 (https://github.com/gridcast)";
const RETRY_DELAY_SECS: u64 = 5;

/// How transient fetch failures are retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Fixed delay between attempts.
    pub delay: Duration,

    /// `None` keeps retrying until the fetch succeeds or is cancelled.
    /// `Some(n)` gives up after `n` attempts with
    /// [`FetchError::AttemptsExhausted`].
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(RETRY_DELAY_SECS),
            max_attempts: None,
        }
    }
}

/// One failed fetch attempt. Every variant is retried.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payload is missing {0:?}")]
    MissingKey(&'static str),

    #[error("payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ForecastClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(NWS_URL)
    }

    /// Point the client at an alternate service (tests use this).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the hourly forecast, or `None` when the location has no grid
    /// cell yet.
    pub async fn hourly_forecast(
        &self,
        location: &LocationConfig,
        cancel: &CancellationToken,
    ) -> Result<Option<ForecastPayload>, FetchError> {
        let Some(grid) = grid_segment(location) else {
            tracing::debug!("Location has no grid cell, skipping hourly forecast fetch");
            return Ok(None);
        };

        let url = format!("{}/gridpoints/{}/forecast/hourly", self.base_url, grid);
        let payload = self
            .fetch_with_retry(&url, "properties", "hourly forecast", cancel)
            .await?;
        Ok(Some(payload))
    }

    /// Fetch the detailed (12-hour period) forecast, or `None` when the
    /// location has no grid cell yet.
    pub async fn detailed_forecast(
        &self,
        location: &LocationConfig,
        cancel: &CancellationToken,
    ) -> Result<Option<ForecastPayload>, FetchError> {
        let Some(grid) = grid_segment(location) else {
            tracing::debug!("Location has no grid cell, skipping detailed forecast fetch");
            return Ok(None);
        };

        let url = format!("{}/gridpoints/{}/forecast", self.base_url, grid);
        let payload = self
            .fetch_with_retry(&url, "properties", "detailed forecast", cancel)
            .await?;
        Ok(Some(payload))
    }

    /// Fetch the active alerts for the location's state, or `None` when no
    /// state is configured.
    pub async fn active_alerts(
        &self,
        location: &LocationConfig,
        cancel: &CancellationToken,
    ) -> Result<Option<AlertsPayload>, FetchError> {
        let Some(state) = location.state.as_deref() else {
            tracing::debug!("Location has no state, skipping active alerts fetch");
            return Ok(None);
        };

        let url = format!("{}/alerts/active?area={}", self.base_url, state);
        let payload = self
            .fetch_with_retry(&url, "features", "active alerts", cancel)
            .await?;
        Ok(Some(payload))
    }

    /// Fetch and parse `url`, retrying on any transport or payload-shape
    /// failure at the policy's fixed delay. The wait between attempts
    /// selects on `cancel`, so a stuck loop can be stopped.
    async fn fetch_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        expected_key: &'static str,
        what: &'static str,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt::<T>(url, expected_key).await {
                Ok(payload) => {
                    if attempt > 1 {
                        tracing::info!("Fetched {} data after {} attempts", what, attempt);
                    }
                    return Ok(payload);
                }
                Err(e) => {
                    tracing::error!("Failed to fetch {} data, retrying: {}", what, e);
                    if let Some(max) = self.retry.max_attempts {
                        if attempt >= max {
                            return Err(FetchError::AttemptsExhausted(max));
                        }
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                        _ = tokio::time::sleep(self.retry.delay) => {}
                    }
                }
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &str,
        expected_key: &'static str,
    ) -> Result<T, AttemptError> {
        // NWS reports errors as JSON problem documents, so shape is the
        // check here, not status: a body without the expected key is a
        // failed attempt whatever the status line said.
        let body: serde_json::Value = self.client.get(url).send().await?.json().await?;
        if body.get(expected_key).is_none() {
            return Err(AttemptError::MissingKey(expected_key));
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// The `{office}/{gridX},{gridY}` URL segment, or `None` when any part of
/// the grid cell is missing from the record.
fn grid_segment(location: &LocationConfig) -> Option<String> {
    let office = location.office.as_deref()?;
    let grid_x = location.grid_x.as_deref()?;
    let grid_y = location.grid_y.as_deref()?;
    Some(format!("{}/{},{}", office, grid_x, grid_y))
}
