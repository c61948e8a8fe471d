//! Bot application configuration
//!
//! Loads the application credentials and SDK options from environment
//! variables (with `.env` support).

use serde::Deserialize;
use std::env;

/// SDK configuration for one bot application
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Application identifier issued by the platform
    pub app_id: String,
    /// Application secret used for credential fetch and webhook signatures
    pub secret: String,
    /// Use the sandbox API domain
    #[serde(default)]
    pub sandbox: bool,
    /// REST request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override for the credential authority endpoint
    #[serde(default)]
    pub auth_url: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl BotConfig {
    /// Create a config from explicit credentials
    #[must_use]
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret: secret.into(),
            sandbox: false,
            timeout_secs: default_timeout_secs(),
            auth_url: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Reads `BOT_APP_ID`, `BOT_SECRET`, `BOT_SANDBOX`, `BOT_TIMEOUT_SECS`,
    /// and `BOT_AUTH_URL`. A `.env` file is loaded first when present.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Self {
            app_id: env::var("BOT_APP_ID").map_err(|_| ConfigError::MissingVar("BOT_APP_ID"))?,
            secret: env::var("BOT_SECRET").map_err(|_| ConfigError::MissingVar("BOT_SECRET"))?,
            sandbox: env::var("BOT_SANDBOX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            timeout_secs: env::var("BOT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout_secs),
            auth_url: env::var("BOT_AUTH_URL").ok().filter(|s| !s.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate that the credentials are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("app_id", "must not be empty".to_string()));
        }
        if self.secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("secret", "must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
