//! Open-Meteo forecast provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use stylecast_core::ForecastConfig;

use crate::types::{ForecastError, ForecastResult, Location};

/// Source of forecast data for the coordinator.
#[async_trait]
pub trait ForecastClient: Send + Sync {
    /// Fetch the current temperature and today's hourly series.
    async fn get_forecast(&self) -> Result<ForecastResult, ForecastError>;
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: CurrentWeatherBlock,
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherBlock {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    temperature_2m: Vec<f64>,
}

/// Fetches forecasts for one fixed location.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Arc<Client>,
    base_url: String,
    location: Location,
}

impl OpenMeteoProvider {
    pub fn new(config: &ForecastConfig) -> Result<Self, ForecastError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            location: Location {
                latitude: config.latitude,
                longitude: config.longitude,
                name: config.location_name.clone(),
            },
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    fn forecast_url(&self) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current_weather=true&hourly=temperature_2m&timezone=auto&forecast_days=1",
            self.base_url, self.location.latitude, self.location.longitude
        )
    }
}

#[async_trait]
impl ForecastClient for OpenMeteoProvider {
    #[instrument(skip(self), fields(location = %self.location.name), level = "info")]
    async fn get_forecast(&self) -> Result<ForecastResult, ForecastError> {
        let response = self.client.get(self.forecast_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Forecast request failed with status {}", status);
            return Err(ForecastError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::Parse(format!("JSON parse error: {}", e)))?;

        let result = ForecastResult::new(body.current_weather.temperature, body.hourly.temperature_2m)?;
        tracing::info!(
            "Forecast fetched: {}°C, {} hourly values",
            result.current_temperature,
            result.hourly_series.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url_contains_coordinates() {
        let config = ForecastConfig {
            base_url: "http://localhost:9999/v1/".to_string(),
            ..ForecastConfig::default()
        };
        let provider = OpenMeteoProvider::new(&config).unwrap();
        let url = provider.forecast_url();

        assert!(url.starts_with("http://localhost:9999/v1/forecast?"));
        assert!(url.contains("latitude=37.5"));
        assert!(url.contains("longitude=126.9"));
        assert!(url.contains("current_weather=true"));
        assert!(url.contains("hourly=temperature_2m"));
        assert!(url.contains("forecast_days=1"));
    }

    #[test]
    fn test_location_from_config() {
        let provider = OpenMeteoProvider::new(&ForecastConfig::default()).unwrap();
        assert_eq!(provider.location().name, "서울");
        assert_eq!(provider.location().latitude, 37.5);
    }
}
