use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variables checked (in order) for the advice API key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["STYLECAST_GEMINI_KEY", "GEMINI_API_KEY"];

/// Environment variable overriding the advice model id.
pub const MODEL_ENV_VAR: &str = "STYLECAST_MODEL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast service settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Advice generation settings
    #[serde(default)]
    pub advice: AdviceConfig,

    /// Coordinator timeouts and wiring
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Open-Meteo API base URL
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Place name used in prompts and display
    #[serde(default = "default_location_name")]
    pub location_name: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_forecast_timeout")]
    pub timeout_secs: u64,
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_latitude() -> f64 {
    37.5
}

fn default_longitude() -> f64 {
    126.9
}

fn default_location_name() -> String {
    "서울".to_string()
}

fn default_forecast_timeout() -> u64 {
    10
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            location_name: default_location_name(),
            timeout_secs: default_forecast_timeout(),
        }
    }
}

impl ForecastConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceConfig {
    /// Gemini API key. Absent means advice is reported as not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier passed to `generateContent`
    #[serde(default = "default_model")]
    pub model: String,

    /// Generative Language API base URL
    #[serde(default = "default_advice_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_advice_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_advice_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_advice_timeout() -> u64 {
    20
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_advice_base_url(),
            timeout_secs: default_advice_timeout(),
        }
    }
}

impl AdviceConfig {
    /// Check if a usable key is configured (not empty, not a placeholder)
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(str::trim)
            .is_some_and(|k| !k.is_empty() && !k.starts_with("YOUR_"))
    }

    /// The configured key, or `MissingSetting` if there is none.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.is_configured() {
            if let Some(key) = self.api_key.as_deref() {
                return Ok(key.trim());
            }
        }
        Err(ConfigError::MissingSetting("advice.api_key".to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Upper bound for one forecast fetch, in seconds
    #[serde(default = "default_primary_timeout")]
    pub primary_timeout_secs: u64,

    /// Upper bound for one advice generation, in seconds
    #[serde(default = "default_derived_timeout")]
    pub derived_timeout_secs: u64,

    /// Request advice automatically after each successful forecast
    #[serde(default = "default_chain_advice")]
    pub chain_advice: bool,
}

fn default_primary_timeout() -> u64 {
    15
}

fn default_derived_timeout() -> u64 {
    30
}

fn default_chain_advice() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            primary_timeout_secs: default_primary_timeout(),
            derived_timeout_secs: default_derived_timeout(),
            chain_advice: default_chain_advice(),
        }
    }
}

impl CoordinatorConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_timeout_secs)
    }

    pub fn derived_timeout(&self) -> Duration {
        Duration::from_secs(self.derived_timeout_secs)
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a default
    /// file if it doesn't exist, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            config
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path without env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            tracing::debug!("Using advice API key from environment");
            self.advice.api_key = Some(key);
        }

        if let Some(model) = lookup(MODEL_ENV_VAR).filter(|m| !m.trim().is_empty()) {
            tracing::debug!("Using advice model from environment: {}", model);
            self.advice.model = model;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_url(&self.forecast.base_url, "forecast.base_url", &mut result);
        Self::validate_url(&self.advice.base_url, "advice.base_url", &mut result);

        if !(-90.0..=90.0).contains(&self.forecast.latitude) {
            result.add_error("forecast.latitude", "Latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.forecast.longitude) {
            result.add_error("forecast.longitude", "Longitude must be between -180 and 180");
        }

        if self.forecast.timeout_secs == 0 {
            result.add_error("forecast.timeout_secs", "Timeout must be greater than 0");
        }
        if self.advice.timeout_secs == 0 {
            result.add_error("advice.timeout_secs", "Timeout must be greater than 0");
        }
        if self.coordinator.primary_timeout_secs == 0 {
            result.add_error(
                "coordinator.primary_timeout_secs",
                "Timeout must be greater than 0",
            );
        }
        if self.coordinator.derived_timeout_secs == 0 {
            result.add_error(
                "coordinator.derived_timeout_secs",
                "Timeout must be greater than 0",
            );
        }

        if self.advice.model.trim().is_empty() {
            result.add_error("advice.model", "Model identifier must not be empty");
        }

        // Advice degrades to a fixed message without a key
        if !self.advice.is_configured() {
            result.add_warning(
                "advice.api_key",
                "Advice API key not configured - recommendations will be unavailable",
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the given path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("stylecast");

        Ok(config_dir.join("config.toml"))
    }
}
