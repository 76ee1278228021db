//! Forecast service for Stylecast
//!
//! Provides current temperature and a 24-hour series via the Open-Meteo API.

pub mod provider;
pub mod types;

pub use provider::{ForecastClient, OpenMeteoProvider};
pub use types::*;
