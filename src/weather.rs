//! Weather provider client and payload normalization
//!
//! Fetches day-by-day forecasts from the Visual Crossing timeline API and
//! strips the oversized payload down to the fields the system persists.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::TripMateError;
use crate::models::{DateRange, DayForecast, TripWeather, WeatherAlert};

pub use visualcrossing::{RawAlert, RawDay, RawForecast};

/// Source of raw forecast payloads for a location and date range
///
/// The production implementation is [`VisualCrossingClient`]; tests inject
/// stubs to exercise the aggregate without network access.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the raw forecast for `location` over `range`
    ///
    /// One outbound network call. Fails with [`TripMateError::Provider`]
    /// when the remote call fails, returns a non-success status, or the
    /// payload lacks the expected per-day array.
    async fn fetch(&self, location: &str, range: DateRange) -> crate::Result<RawForecast>;
}

/// HTTP client for the Visual Crossing timeline API
pub struct VisualCrossingClient {
    client: Client,
    config: WeatherConfig,
}

impl VisualCrossingClient {
    /// Create a new client with a bounded request timeout
    pub fn new(config: WeatherConfig) -> crate::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("TripMate/0.1.0")
            .build()
            .map_err(|e| TripMateError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn request_url(&self, location: &str, range: DateRange) -> String {
        let mut url = format!(
            "{}/{}/{}/{}?unitGroup={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(location),
            range.start,
            range.end,
            self.config.unit_group,
        );
        if let Some(key) = &self.config.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

#[async_trait]
impl ForecastProvider for VisualCrossingClient {
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str, range: DateRange) -> crate::Result<RawForecast> {
        if location.trim().is_empty() {
            return Err(TripMateError::validation("Location cannot be empty"));
        }

        info!("Fetching forecast for '{location}' ({} to {})", range.start, range.end);

        let url = self.request_url(location, range);
        let response = self.client.get(&url).send().await.map_err(|e| {
            let status = e.status().map_or(502, |s| s.as_u16());
            warn!("Weather request failed: {e}");
            TripMateError::provider(status, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Weather API returned {status}: {body}");
            return Err(TripMateError::provider(status.as_u16(), body));
        }

        let raw: RawForecast = response.json().await.map_err(|e| {
            TripMateError::provider(status.as_u16(), format!("Unparseable weather payload: {e}"))
        })?;

        if raw.days.is_none() {
            return Err(TripMateError::provider(
                status.as_u16(),
                "Weather payload is missing the per-day forecast array",
            ));
        }

        debug!(
            "Received {} forecast days for '{location}'",
            raw.days.as_ref().map_or(0, Vec::len)
        );
        Ok(raw)
    }
}

/// Reduce a raw provider payload to the normalized trip weather shape
///
/// Pure, no I/O, never fails: missing `resolvedAddress` and `description`
/// fall back to sentinel strings, days with unparseable dates are dropped,
/// and only the first alert is kept (later alerts are discarded by policy).
#[must_use]
pub fn normalize(raw: RawForecast) -> TripWeather {
    let days = raw
        .days
        .unwrap_or_default()
        .into_iter()
        .filter_map(|day| {
            let date = crate::models::parse_date(&day.datetime).ok()?;
            Some(DayForecast {
                date,
                tempmin: day.tempmin.unwrap_or_default(),
                tempmax: day.tempmax.unwrap_or_default(),
                precipprob: day.precipprob.unwrap_or_default(),
                conditions: day.conditions.unwrap_or_default(),
                icon: day.icon.unwrap_or_default(),
                description: day.description,
            })
        })
        .collect();

    let alert = raw
        .alerts
        .unwrap_or_default()
        .into_iter()
        .next()
        .map_or_else(WeatherAlert::none, |first| WeatherAlert {
            event: first.event,
            link: first.link,
        });

    TripWeather {
        resolved_address: raw
            .resolved_address
            .unwrap_or_else(|| "Unknown location".to_string()),
        description: raw
            .description
            .unwrap_or_else(|| "No description available".to_string()),
        alert,
        days,
    }
}

/// Visual Crossing timeline API response structures
mod visualcrossing {
    use serde::Deserialize;

    /// Timeline forecast response, reduced to the fields we consume
    #[derive(Debug, Clone, Deserialize)]
    pub struct RawForecast {
        /// Address the provider resolved the query location to
        #[serde(rename = "resolvedAddress")]
        pub resolved_address: Option<String>,
        /// Overall description for the requested range
        pub description: Option<String>,
        /// Per-day forecast array; absence marks an unusable payload
        pub days: Option<Vec<RawDay>>,
        /// Active weather alerts for the location
        pub alerts: Option<Vec<RawAlert>>,
    }

    /// One day of raw forecast data
    #[derive(Debug, Clone, Deserialize)]
    pub struct RawDay {
        /// Calendar date as `YYYY-MM-DD`
        pub datetime: String,
        pub tempmin: Option<f64>,
        pub tempmax: Option<f64>,
        pub precipprob: Option<f64>,
        pub conditions: Option<String>,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    /// One raw weather alert
    #[derive(Debug, Clone, Deserialize)]
    pub struct RawAlert {
        pub event: String,
        pub link: Option<String>,
    }
}
