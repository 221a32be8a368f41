//! The per-row lookup loop.
//!
//! Each ticker is resolved independently with a single GET to
//! `{base_url}/{ticker}`. Failures never escape a row: they are classified
//! into a [`Sentinel`] and the loop moves on.

use crate::core::pacing::{Pacer, PacingConfig, PacingPolicy};
use crate::domain::model::{
    Progress, Resolution, Sentinel, Ticker, ADDRESS_NOT_FOUND, NETWORK_ID_NOT_FOUND,
};
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::validate_url;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://address-svc-utyjy373hq-uc.a.run.app/symbols";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct AddressResolver<P: PacingPolicy = Pacer> {
    client: Client,
    base_url: Url,
    timeout: Duration,
    include_network: bool,
    pacer: P,
}

impl<P: PacingPolicy> AddressResolver<P> {
    pub fn new(base_url: &str, pacer: P) -> Result<Self> {
        let base_url = validate_url("base_url", base_url)?;
        let client = Client::builder()
            .user_agent(concat!("token-address-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            include_network: false,
            pacer,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Also extract `networkId` from each response.
    pub fn with_network_id(mut self, include_network: bool) -> Self {
        self.include_network = include_network;
        self
    }

    pub fn includes_network(&self) -> bool {
        self.include_network
    }

    /// The ticker becomes one percent-encoded path segment under the base URL.
    pub fn lookup_url(&self, ticker: &Ticker) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ticker.as_str());
        }
        url
    }

    /// Resolves one raw cell without pacing.
    pub async fn resolve_one(&self, raw: &Value) -> Resolution {
        match Ticker::normalize(raw) {
            Some(ticker) => self.fetch(&ticker).await,
            None => Resolution::Failed(Sentinel::InvalidTicker),
        }
    }

    /// Resolves every cell in order, pausing after each request and
    /// reporting progress after each row.
    pub async fn resolve_all<F>(&self, raws: &[Value], mut on_progress: F) -> Vec<Resolution>
    where
        F: FnMut(Progress),
    {
        let total = raws.len();
        let mut resolutions = Vec::with_capacity(total);

        for (i, raw) in raws.iter().enumerate() {
            let resolution = match Ticker::normalize(raw) {
                Some(ticker) => {
                    let resolution = self.fetch(&ticker).await;
                    self.pacer.pause().await;
                    resolution
                }
                None => {
                    tracing::debug!("Row {}: invalid ticker {:?}", i + 1, raw);
                    Resolution::Failed(Sentinel::InvalidTicker)
                }
            };

            resolutions.push(resolution);
            let progress = Progress {
                completed: i + 1,
                total,
            };
            tracing::debug!(
                "Progress {}/{} ({:.0}%)",
                progress.completed,
                progress.total,
                progress.fraction() * 100.0
            );
            on_progress(progress);
        }

        resolutions
    }

    async fn fetch(&self, ticker: &Ticker) -> Resolution {
        let url = self.lookup_url(ticker);
        tracing::debug!("Looking up {} at {}", ticker, url);

        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request for {} failed: {}", ticker, e);
                return Resolution::Failed(Sentinel::ApiError);
            }
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            tracing::debug!("Lookup for {} returned {}", ticker, status);
            return Resolution::Failed(Sentinel::NotFound);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Reading response for {} failed: {}", ticker, e);
                return Resolution::Failed(Sentinel::ApiError);
            }
        };

        match parse_lookup_body(&body, self.include_network) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!("Unusable response for {}: {}", ticker, e);
                Resolution::Failed(Sentinel::ProcessingError)
            }
        }
    }
}

fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Interprets a success body: `{"address": "...", "networkId": "..."}`.
pub fn parse_lookup_body(body: &[u8], include_network: bool) -> Result<Resolution> {
    let value: Value = serde_json::from_slice(body)?;
    let object = value.as_object().ok_or_else(|| FinderError::ProcessingError {
        message: "response body is not a JSON object".to_string(),
    })?;

    let address =
        field_text(object.get("address")).unwrap_or_else(|| ADDRESS_NOT_FOUND.to_string());
    let network_id = include_network.then(|| {
        field_text(object.get("networkId")).unwrap_or_else(|| NETWORK_ID_NOT_FOUND.to_string())
    });

    Ok(Resolution::Resolved {
        address,
        network_id,
    })
}

/// One-shot resolution with the default timeout and pacing.
pub async fn resolve(tickers: &[Value], base_url: &str) -> Result<Vec<Resolution>> {
    let resolver = AddressResolver::new(base_url, Pacer::from_config(&PacingConfig::default()))?;
    Ok(resolver.resolve_all(tickers, |_| {}).await)
}
