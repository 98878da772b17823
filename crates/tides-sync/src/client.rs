//! HTTP client for the forecast server.

use std::time::Duration;

use reqwest::Client;
use tracing::instrument;
use url::Url;

use tides_core::SyncConfig;

use crate::error::{SyncError, SyncResult};
use crate::payload::ForecastPayload;
use crate::retry::{with_retry, RetryConfig};

/// Fetches forecasts from `{api_url}?location={id}`.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    api_url: Url,
    retry: RetryConfig,
}

impl ForecastClient {
    pub fn new(api_url: &str, timeout: Duration) -> SyncResult<Self> {
        let api_url =
            Url::parse(api_url).map_err(|e| SyncError::InvalidUrl(format!("{api_url}: {e}")))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(SyncError::InvalidUrl(format!(
                "{api_url}: unsupported scheme"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SyncError::from)?;

        Ok(Self {
            client,
            api_url,
            retry: RetryConfig::default(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    /// Replace the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn forecast_url(&self, location_id: i64) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("location", &location_id.to_string());
        url
    }

    /// Fetch the current forecast for a location.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, location_id: i64) -> SyncResult<ForecastPayload> {
        let url = self.forecast_url(location_id);
        let response = with_retry(self.retry.clone(), || self.client.get(url.clone()).send()).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ForecastPayload = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        tracing::info!(
            "Fetched forecast for location {}: {} weather days, {} surf days",
            location_id,
            payload.weather.len(),
            payload.surf.len()
        );
        Ok(payload)
    }
}
