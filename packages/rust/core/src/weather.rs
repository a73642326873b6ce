//! Seven-day forecast with a synthetic fallback series.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use cityscout_providers::{CredentialProvider, FORECAST_DAYS, ForecastClient, Service};
use cityscout_shared::{Coordinates, DailyForecast, Failure, ProviderError, Source, Sourced};
use tracing::{info, instrument, warn};

const FORECAST_PROVIDER: &str = "tomorrow.io";

/// Placeholder series starting at `start`: highs `20+i`, lows `10+i`, no rain.
pub fn synthetic_forecast(start: NaiveDate) -> Vec<DailyForecast> {
    (0..FORECAST_DAYS)
        .map(|i| {
            let date = start
                .checked_add_days(Days::new(i as u64))
                .unwrap_or(start);
            DailyForecast {
                date: date.format("%Y-%m-%d").to_string(),
                temp_max: 20.0 + i as f64,
                temp_min: 10.0 + i as f64,
                precipitation: 0.0,
            }
        })
        .collect()
}

pub struct WeatherAdapter {
    client: ForecastClient,
    credentials: Arc<dyn CredentialProvider>,
}

impl WeatherAdapter {
    pub fn new(client: ForecastClient, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Forecast at `at`. Never fails; any problem yields [`synthetic_forecast`] from today.
    #[instrument(skip_all, fields(location = %at))]
    pub async fn forecast(&self, at: Coordinates) -> Sourced<Vec<DailyForecast>> {
        let result = match self.credentials.get(Service::Weather) {
            Some(api_key) => self.client.daily(&api_key, at).await,
            None => Err(ProviderError::missing_credential(
                &self.credentials.describe(Service::Weather),
            )),
        };

        match result {
            Ok(days) => {
                info!(days = days.len(), "forecast fetched");
                Sourced::new(days, Source::live(FORECAST_PROVIDER))
            }
            Err(error) => {
                warn!(%error, "forecast unavailable, using synthetic series");
                Sourced::new(
                    synthetic_forecast(Local::now().date_naive()),
                    Source::Synthetic {
                        failures: vec![Failure::new(FORECAST_PROVIDER, error)],
                    },
                )
            }
        }
    }
}
