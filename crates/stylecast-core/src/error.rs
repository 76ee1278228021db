//! Shared error types for Stylecast.
//!
//! Transport and configuration failures are defined here so the weather and
//! advice crates classify them the same way. What a failure looks like to a
//! user is decided by the [`ErrorKind`] of the service error wrapping it.

use thiserror::Error;

/// Message shown when the forecast could not be fetched.
pub const FORECAST_FAILED_MESSAGE: &str = "날씨 데이터를 가져오는데 실패했습니다.";

/// Advice shown when no generation credential is configured.
pub const ADVICE_NOT_CONFIGURED_MESSAGE: &str = "API 키가 설정되지 않았습니다.";

/// Advice shown when generation failed for any other reason.
pub const ADVICE_UNAVAILABLE_MESSAGE: &str = "AI 스타일리스트가 잠시 자리를 비웠어요. 😅";

/// Coarse classification used by the coordinator to decide how a failure
/// surfaces to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Primary fetch failed: transport, non-2xx, malformed body or timeout.
    NetworkFailure,
    /// Derived fetch has no credential to work with.
    ConfigurationMissing,
    /// Derived fetch reached the service but got nothing usable back.
    GenerationFailure,
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display_includes_status() {
        let err = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "Server error: 503 - unavailable");
    }

    #[test]
    fn test_config_error_display_names_setting() {
        let err = ConfigError::MissingSetting("advice.api_key".into());
        assert_eq!(err.to_string(), "Missing required setting: advice.api_key");
    }

    #[test]
    fn test_fallback_messages_are_distinct() {
        assert_ne!(ADVICE_NOT_CONFIGURED_MESSAGE, ADVICE_UNAVAILABLE_MESSAGE);
        assert!(!FORECAST_FAILED_MESSAGE.is_empty());
    }
}
