//! Application configuration.
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the
//! `SUPPORT_RELAY` prefix and `__` separating nested sections.
//!
//! # Example
//!
//! ```no_run
//! use support_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("failed to load configuration");
//! config.validate().expect("invalid configuration");
//! ```

mod ai;
mod database;
mod dialogue;
mod error;
mod messenger;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use dialogue::DialogueConfig;
pub use error::{ConfigError, ValidationError};
pub use messenger::MessengerConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, environment, logging).
    #[serde(default)]
    pub server: ServerConfig,

    /// Messenger platform configuration (tokens, Graph API).
    pub messenger: MessengerConfig,

    /// AI oracle configuration (Gemini, OpenAI).
    #[serde(default)]
    pub ai: AiConfig,

    /// Dialogue completion timing.
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Database configuration (knowledge store, turn recorder).
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file if present, then reads variables like
    /// `SUPPORT_RELAY__SERVER__PORT=8080` and
    /// `SUPPORT_RELAY__MESSENGER__VERIFY_TOKEN=...` into typed sections.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUPPORT_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.messenger.validate()?;
        self.ai.validate()?;
        self.dialogue.validate()?;
        self.database.validate()?;
        Ok(())
    }

    /// Check if running in production environment.
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
