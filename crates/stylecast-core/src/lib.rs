pub mod config;
pub mod error;
pub mod status;

pub use config::{
    AdviceConfig, Config, CoordinatorConfig, ForecastConfig, ValidationResult,
};
pub use error::{
    ConfigError, ErrorKind, NetworkError, ReqwestErrorExt, ADVICE_NOT_CONFIGURED_MESSAGE,
    ADVICE_UNAVAILABLE_MESSAGE, FORECAST_FAILED_MESSAGE,
};
pub use status::Status;

/// Initialize logging. Safe to call more than once.
pub fn init() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Stylecast core initialized");
    }
}
