//! Advice-specific error types.

use std::time::Duration;

use stylecast_core::{
    ErrorKind, NetworkError, ReqwestErrorExt, ADVICE_NOT_CONFIGURED_MESSAGE,
    ADVICE_UNAVAILABLE_MESSAGE,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Advice API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Malformed model output: {0}")]
    Malformed(String),

    #[error("Advice generation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for AdviceError {
    fn from(e: reqwest::Error) -> Self {
        AdviceError::Network(e.into_network_error())
    }
}

impl AdviceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::ConfigurationMissing,
            _ => ErrorKind::GenerationFailure,
        }
    }

    /// Text shown in place of advice when generation fails.
    pub fn fallback_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ConfigurationMissing => ADVICE_NOT_CONFIGURED_MESSAGE,
            _ => ADVICE_UNAVAILABLE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_kind_and_fallback() {
        let err = AdviceError::NotConfigured;
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(err.fallback_message(), ADVICE_NOT_CONFIGURED_MESSAGE);
    }

    #[test]
    fn test_generation_failures_share_fallback() {
        let errors = [
            AdviceError::Api {
                status: 429,
                message: "quota".into(),
            },
            AdviceError::EmptyResponse,
            AdviceError::Malformed("not json".into()),
            AdviceError::Timeout(Duration::from_secs(30)),
            AdviceError::Network(NetworkError::Timeout),
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::GenerationFailure);
            assert_eq!(err.fallback_message(), ADVICE_UNAVAILABLE_MESSAGE);
        }
    }
}
