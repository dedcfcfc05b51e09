//! Configuration management for trial-scout.
//!
//! Configuration can be set via environment variables:
//! - `GROQ_API_KEY` - Required. Your Groq API key.
//! - `DEFAULT_MODEL` - Optional. The default LLM model to use. Defaults to `llama-3.3-70b-versatile`.
//! - `REGISTRY_BASE_URL` - Optional. ClinicalTrials.gov studies endpoint override.
//! - `FACILITY_CAP` - Optional. Maximum facilities returned per location query. Defaults to `20`.
//! - `SAMPLE_TITLE_CAP` - Optional. Sample titles returned per count query. Defaults to `3`.
//! - `ELIGIBILITY_MAX_TRIALS` - Optional. Default trials analyzed per eligibility query. Defaults to `5`.

use thiserror::Error;
use url::Url;

use crate::registry::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Caps applied to list-valued summary fields.
///
/// The registry can return far more rows than a model context comfortably
/// holds, so each list-producing query truncates its output.
#[derive(Debug, Clone)]
pub struct SummaryLimits {
    /// Maximum facilities returned by a location query
    pub facility_cap: usize,

    /// Maximum sample titles returned by a count query
    pub sample_title_cap: usize,

    /// Default number of trials analyzed by an eligibility query
    pub eligibility_max_trials: u32,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            facility_cap: 20,
            sample_title_cap: 3,
            eligibility_max_trials: 5,
        }
    }
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key
    pub api_key: String,

    /// Default LLM model identifier
    pub default_model: String,

    /// ClinicalTrials.gov studies endpoint
    pub registry_base_url: Url,

    /// Truncation caps for list-valued summaries
    pub limits: SummaryLimits,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GROQ_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()))?;

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());

        let registry_base_url = std::env::var("REGISTRY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let registry_base_url = Url::parse(&registry_base_url).map_err(|e| {
            ConfigError::InvalidValue("REGISTRY_BASE_URL".to_string(), format!("{}", e))
        })?;

        let facility_cap = std::env::var("FACILITY_CAP")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("FACILITY_CAP".to_string(), format!("{}", e)))?;

        let sample_title_cap = std::env::var("SAMPLE_TITLE_CAP")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("SAMPLE_TITLE_CAP".to_string(), format!("{}", e))
            })?;

        let eligibility_max_trials = std::env::var("ELIGIBILITY_MAX_TRIALS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("ELIGIBILITY_MAX_TRIALS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            api_key,
            default_model,
            registry_base_url,
            limits: SummaryLimits {
                facility_cap,
                sample_title_cap,
                eligibility_max_trials,
            },
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String) -> Self {
        Self {
            api_key,
            default_model,
            registry_base_url: Url::parse(DEFAULT_BASE_URL)
                .expect("default registry URL is valid"),
            limits: SummaryLimits::default(),
        }
    }
}
