//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Root directory for uploaded documents, one subdirectory per module.
    pub upload_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub question_model: String,
    pub plan_model: String,
    /// Upper bound on one model-gateway call.
    pub gateway_timeout: Duration,
    /// Questions generated when the caller does not ask for a count.
    pub default_question_count: u32,
    pub frontend_origin: String,
}

// Debug is manual so the gateway credential can never reach a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("upload_dir", &self.upload_dir)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("question_model", &self.question_model)
            .field("plan_model", &self.plan_model)
            .field("gateway_timeout", &self.gateway_timeout)
            .field("default_question_count", &self.default_question_count)
            .field("frontend_origin", &self.frontend_origin)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        // --- Load API Key (as optional; the server binary refuses to start without it) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Pipeline Settings ---
        let question_model =
            std::env::var("QUESTION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let plan_model =
            std::env::var("PLAN_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_str =
            std::env::var("GATEWAY_TIMEOUT_SECS").unwrap_or_else(|_| "120".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "GATEWAY_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a whole number of seconds", timeout_str),
            )
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_TIMEOUT_SECS".to_string(),
                "the timeout must be at least 1 second".to_string(),
            ));
        }
        let gateway_timeout = Duration::from_secs(timeout_secs);

        let count_str =
            std::env::var("DEFAULT_QUESTION_COUNT").unwrap_or_else(|_| "5".to_string());
        let default_question_count = count_str.parse::<u32>().map_err(|_| {
            ConfigError::InvalidValue(
                "DEFAULT_QUESTION_COUNT".to_string(),
                format!("'{}' is not a whole number", count_str),
            )
        })?;
        if default_question_count == 0 {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_QUESTION_COUNT".to_string(),
                "at least 1 question must be requested".to_string(),
            ));
        }

        let frontend_origin = std::env::var("FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            bind_address,
            log_level,
            upload_dir,
            openai_api_key,
            question_model,
            plan_model,
            gateway_timeout,
            default_question_count,
            frontend_origin,
        })
    }
}
