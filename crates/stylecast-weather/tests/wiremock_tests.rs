//! Integration tests for OpenMeteoProvider using wiremock.

use stylecast_core::ForecastConfig;
use stylecast_weather::{ForecastClient, ForecastError, OpenMeteoProvider, HOURS_PER_DAY};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenMeteoProvider {
    let config = ForecastConfig {
        base_url: format!("{}/v1", server.uri()),
        ..ForecastConfig::default()
    };
    OpenMeteoProvider::new(&config).unwrap()
}

fn forecast_body(current: f64, hours: usize) -> serde_json::Value {
    let temps: Vec<f64> = (0..hours).map(|h| 10.0 + h as f64 / 4.0).collect();
    serde_json::json!({
        "latitude": 37.5,
        "longitude": 126.9,
        "current_weather": {
            "temperature": current,
            "windspeed": 7.2,
            "weathercode": 1,
            "time": "2026-01-30T12:00"
        },
        "hourly": {
            "time": (0..hours).map(|h| format!("2026-01-30T{:02}:00", h % 24)).collect::<Vec<_>>(),
            "temperature_2m": temps
        }
    })
}

#[tokio::test]
async fn test_get_forecast_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "37.5"))
        .and(query_param("longitude", "126.9"))
        .and(query_param("current_weather", "true"))
        .and(query_param("hourly", "temperature_2m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.0, 24)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let forecast = provider_for(&mock_server).get_forecast().await.unwrap();

    assert_eq!(forecast.current_temperature, 18.0);
    assert_eq!(forecast.hourly_series.len(), HOURS_PER_DAY);
    assert_eq!(forecast.hourly_series[0], 10.0);
    assert_eq!(forecast.hourly_series[12], 13.0);
}

#[tokio::test]
async fn test_get_forecast_truncates_multi_day_series() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5.0, 168)))
        .mount(&mock_server)
        .await;

    let forecast = provider_for(&mock_server).get_forecast().await.unwrap();

    assert_eq!(forecast.hourly_series.len(), HOURS_PER_DAY);
    assert_eq!(forecast.hourly_series[23], 15.75);
}

#[tokio::test]
async fn test_get_forecast_short_series_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5.0, 12)))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server).get_forecast().await.unwrap_err();
    assert!(matches!(err, ForecastError::Parse(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn test_get_forecast_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server).get_forecast().await.unwrap_err();
    match err {
        ForecastError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Api error, got {other}"),
    }
}

#[tokio::test]
async fn test_get_forecast_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"current_weather\": 3"))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server).get_forecast().await.unwrap_err();
    assert!(matches!(err, ForecastError::Parse(_)));
}

#[tokio::test]
async fn test_get_forecast_unreachable_host() {
    let config = ForecastConfig {
        base_url: "http://127.0.0.1:1/v1".to_string(),
        ..ForecastConfig::default()
    };
    let provider = OpenMeteoProvider::new(&config).unwrap();

    let err = provider.get_forecast().await.unwrap_err();
    assert!(matches!(err, ForecastError::Network(_)), "unexpected error: {err}");
}
