//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ERGO_INTAKE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use ergo_intake::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod ai;
mod error;
mod retrieval;
mod risk;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use retrieval::{RetrievalConfig, RetrievalProvider};
pub use risk::RiskConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only the OpenAI key is required, and only
/// when the OpenAI provider is selected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Solution database configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Risk model overrides
    #[serde(default)]
    pub risk: RiskConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ERGO_INTAKE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ERGO_INTAKE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ERGO_INTAKE__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ERGO_INTAKE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.retrieval.validate()?;
        self.risk.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "ERGO_INTAKE__AI__OPENAI_API_KEY",
        "ERGO_INTAKE__AI__PROVIDER",
        "ERGO_INTAKE__SERVER__PORT",
        "ERGO_INTAKE__RETRIEVAL__COLLECTION",
        "ERGO_INTAKE__RETRIEVAL__TOP_K",
        "ERGO_INTAKE__RISK__LEGACY_Z",
        "ERGO_INTAKE__RISK__TARGET_PERCENTILE",
    ];

    fn set_minimal_env() {
        env::set_var("ERGO_INTAKE__AI__OPENAI_API_KEY", "sk-test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        let key = config.ai.openai_api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "sk-test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.retrieval.collection, "test_docs");
        assert!(!config.risk.legacy_z);
        assert!(config.validate().is_err(), "OpenAI provider needs a key");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ERGO_INTAKE__AI__PROVIDER", "mock");
        env::set_var("ERGO_INTAKE__SERVER__PORT", "3000");
        env::set_var("ERGO_INTAKE__RETRIEVAL__COLLECTION", "solutions");
        env::set_var("ERGO_INTAKE__RETRIEVAL__TOP_K", "4");
        env::set_var("ERGO_INTAKE__RISK__LEGACY_Z", "true");
        env::set_var("ERGO_INTAKE__RISK__TARGET_PERCENTILE", "50");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.retrieval.collection, "solutions");
        assert_eq!(config.retrieval.top_k, 4);
        assert!(config.risk.legacy_z);
        assert_eq!(config.risk.target_percentile, Some(50));
        assert_eq!(config.risk.model().unwrap().target_z, 0.0);
        assert!(config.validate().is_ok());
    }
}
