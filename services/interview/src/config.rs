//! Application configuration.
//!
//! Loads settings from environment variables into a single struct passed
//! throughout the service.

use std::env;
use tracing::Level;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub chat_model: String,
    pub database_path: String,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `OPENAI_API_KEY`: Your secret key for the generation API. Required to run a session.
    // *   `CHAT_MODEL`: (Optional) The model used for questions and evaluation. Defaults to "gpt-4.1-nano".
    // *   `INTERVIEW_DB`: (Optional) Path of the SQLite database. Defaults to "interviews.db".
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY").ok();
        let chat_model = env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4.1-nano".to_string());
        let database_path =
            env::var("INTERVIEW_DB").unwrap_or_else(|_| "interviews.db".to_string());

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            api_key,
            chat_model,
            database_path,
            log_level,
        })
    }

    /// The API key is only required when a session actually runs; browsing
    /// history works without one.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))
    }
}
