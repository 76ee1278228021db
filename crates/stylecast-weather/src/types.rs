use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use stylecast_core::{ErrorKind, NetworkError, ReqwestErrorExt, FORECAST_FAILED_MESSAGE};

/// Number of entries in an hourly series (one local day).
pub const HOURS_PER_DAY: usize = 24;

/// Geographic location the forecast is requested for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// One successful forecast fetch, folded into the snapshot as soon as it arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Current temperature in Celsius
    pub current_temperature: f64,
    /// Hourly temperatures; index 0 is hour 0 of the local day
    pub hourly_series: Vec<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl ForecastResult {
    /// Build a result, rejecting series shorter than a day and dropping
    /// anything past the first 24 hours.
    pub fn new(current_temperature: f64, mut hourly_series: Vec<f64>) -> Result<Self, ForecastError> {
        if hourly_series.len() < HOURS_PER_DAY {
            return Err(ForecastError::Parse(format!(
                "expected {} hourly values, got {}",
                HOURS_PER_DAY,
                hourly_series.len()
            )));
        }
        hourly_series.truncate(HOURS_PER_DAY);

        Ok(Self {
            current_temperature,
            hourly_series,
            fetched_at: Utc::now(),
        })
    }
}

/// Forecast provider errors. All of them are network failures as far as
/// observers are concerned.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Forecast API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Forecast request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        ForecastError::Network(e.into_network_error())
    }
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::NetworkFailure
    }

    pub fn user_message(&self) -> &'static str {
        FORECAST_FAILED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(len: usize) -> Vec<f64> {
        (0..len).map(|h| h as f64 * 0.5).collect()
    }

    #[test]
    fn test_forecast_result_keeps_first_day() {
        let result = ForecastResult::new(18.0, series(48)).unwrap();
        assert_eq!(result.hourly_series.len(), HOURS_PER_DAY);
        assert_eq!(result.hourly_series[23], 11.5);
        assert_eq!(result.current_temperature, 18.0);
    }

    #[test]
    fn test_forecast_result_rejects_short_series() {
        let err = ForecastResult::new(18.0, series(23)).unwrap_err();
        assert!(matches!(err, ForecastError::Parse(_)));
        assert!(err.to_string().contains("23"));
    }

    #[test]
    fn test_forecast_result_passes_values_through() {
        let mut values = series(24);
        values[0] = -42.0;
        values[12] = 61.0;
        let result = ForecastResult::new(-3.5, values).unwrap();
        assert_eq!(result.hourly_series[0], -42.0);
        assert_eq!(result.hourly_series[12], 61.0);
    }

    #[test]
    fn test_every_error_is_network_failure() {
        let errors = [
            ForecastError::Network(NetworkError::Timeout),
            ForecastError::Api {
                status: 503,
                message: "down".into(),
            },
            ForecastError::Parse("bad".into()),
            ForecastError::Timeout(Duration::from_secs(1)),
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::NetworkFailure);
            assert_eq!(err.user_message(), FORECAST_FAILED_MESSAGE);
        }
    }
}
