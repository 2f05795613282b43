//! Configuration management for crewhub.
//!
//! Configuration is set via environment variables:
//! - `AGENTS_ENDPOINT` - Required. Base URL of the hosted agents service.
//! - `AGENTS_API_KEY` - Required. Bearer token for the agents service.
//! - `MODEL_DEPLOYMENT` - Required. Model deployment name used for every agent.
//! - `SALES_API_ENDPOINT` - Optional. Sales query API base URL. Defaults to `http://127.0.0.1:8100`.
//! - `WEB_GROUNDING_CONNECTION_ID` - Optional. Enables web grounding for the market researcher.
//! - `DATASHEET_PATH` - Optional. Product datasheet indexed for file search.
//! - `RUN_TIMEOUT_SECS` - Optional. Wall-clock ceiling for one run. Defaults to `300`.
//! - `RUN_POLL_INTERVAL_MS` - Optional. Run status poll interval. Defaults to `1000`.
//! - `ASSETS_DIR` - Optional. Directory holding instructions and the API spec. Defaults to `assets`.
//!
//! The `sales-api` binary reads its own `HOST`, `PORT`, and `SALES_DB_PATH`
//! variables directly; they are not part of this config.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted agents service
    pub agents_endpoint: String,

    /// API key for the agents service
    pub api_key: String,

    /// Model deployment name used for every agent
    pub model: String,

    /// Base URL of the sales query API (substituted into the OpenAPI spec)
    pub sales_api_endpoint: String,

    /// Web-grounding connection id; the market researcher gets the tool only
    /// when this is set
    pub web_grounding_connection_id: Option<String>,

    /// Product datasheet indexed into a vector store for file search
    pub datasheet_path: Option<PathBuf>,

    /// Wall-clock ceiling for one coordinator run
    pub run_timeout: Duration,

    /// Interval between run status polls
    pub poll_interval: Duration,

    /// Directory holding instruction files and the sales API spec
    pub assets_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let agents_endpoint = std::env::var("AGENTS_ENDPOINT")
            .map_err(|_| ConfigError::MissingEnvVar("AGENTS_ENDPOINT".to_string()))?;

        let api_key = std::env::var("AGENTS_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("AGENTS_API_KEY".to_string()))?;

        let model = std::env::var("MODEL_DEPLOYMENT")
            .map_err(|_| ConfigError::MissingEnvVar("MODEL_DEPLOYMENT".to_string()))?;

        let sales_api_endpoint = std::env::var("SALES_API_ENDPOINT")
            .unwrap_or_else(|_| "http://127.0.0.1:8100".to_string());

        let run_timeout_secs: u64 = std::env::var("RUN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("RUN_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        let poll_interval_ms: u64 = std::env::var("RUN_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("RUN_POLL_INTERVAL_MS".to_string(), format!("{}", e))
            })?;

        let assets_dir = std::env::var("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets"));

        Ok(Self {
            agents_endpoint,
            api_key,
            model,
            sales_api_endpoint,
            web_grounding_connection_id: std::env::var("WEB_GROUNDING_CONNECTION_ID").ok(),
            datasheet_path: std::env::var("DATASHEET_PATH").ok().map(PathBuf::from),
            run_timeout: Duration::from_secs(run_timeout_secs),
            poll_interval: Duration::from_millis(poll_interval_ms),
            assets_dir,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(agents_endpoint: String, api_key: String, model: String) -> Self {
        Self {
            agents_endpoint,
            api_key,
            model,
            sales_api_endpoint: "http://127.0.0.1:8100".to_string(),
            web_grounding_connection_id: None,
            datasheet_path: None,
            run_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_millis(1000),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new(
            "http://agents.local".to_string(),
            "key".to_string(),
            "gpt-4o".to_string(),
        );
        assert_eq!(config.run_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert!(config.web_grounding_connection_id.is_none());
    }
}
