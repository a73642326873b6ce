//! Tomorrow.io daily forecast client.

use cityscout_shared::{Coordinates, DailyForecast, ProviderError, Result, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::{build_client, classify_status, classify_transport, endpoint};

/// Days kept from the daily timeline.
pub const FORECAST_DAYS: usize = 7;

const DEFAULT_TEMP_MAX: f64 = 20.0;
const DEFAULT_TEMP_MIN: f64 = 10.0;
const DEFAULT_PRECIPITATION: f64 = 0.0;

#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    http: Client,
}

impl ForecastClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            http: build_client(config.timeout())?,
        })
    }

    /// Daily forecast at `at`, at most [`FORECAST_DAYS`] entries in service order.
    ///
    /// Missing values default to 20/10/0 and every value is rounded to one
    /// decimal. A timeline with fewer days yields fewer entries.
    #[instrument(skip(self, api_key), fields(location = %at))]
    pub async fn daily(
        &self,
        api_key: &str,
        at: Coordinates,
    ) -> std::result::Result<Vec<DailyForecast>, ProviderError> {
        let url = endpoint(&self.base_url, "v4/weather/forecast")
            .map_err(|e| ProviderError::malformed(e.to_string()))?;
        let location = format!("{},{}", at.latitude, at.longitude);

        let response = self
            .http
            .get(url)
            .query(&[
                ("location", location.as_str()),
                ("timesteps", "1d"),
                ("units", "metric"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("forecast body: {e}")))?;

        let days: Vec<DailyForecast> = parsed
            .timelines
            .daily
            .into_iter()
            .take(FORECAST_DAYS)
            .map(DailyEntry::into_forecast)
            .collect();

        debug!(days = days.len(), "forecast received");
        Ok(days)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    timelines: Timelines,
}

#[derive(Debug, Default, Deserialize)]
struct Timelines {
    #[serde(default)]
    daily: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(default)]
    time: String,
    #[serde(default)]
    values: DailyValues,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyValues {
    temperature_max: Option<f64>,
    temperature_min: Option<f64>,
    precipitation_sum: Option<f64>,
}

impl DailyEntry {
    fn into_forecast(self) -> DailyForecast {
        DailyForecast {
            date: self.time.chars().take(10).collect(),
            temp_max: round1(self.values.temperature_max.unwrap_or(DEFAULT_TEMP_MAX)),
            temp_min: round1(self.values.temperature_min.unwrap_or(DEFAULT_TEMP_MIN)),
            precipitation: round1(
                self.values
                    .precipitation_sum
                    .unwrap_or(DEFAULT_PRECIPITATION),
            ),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
