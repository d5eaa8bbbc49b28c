//! Configuration management for the realty lead agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (REALTY_AGENT_ prefix, `__` separator)
//! - Plain deployment variables (`PORT`, `ADMIN_PASSWORD`, `SMTP_*`)

pub mod constants;
pub mod dialogue;
pub mod settings;

pub use dialogue::{DialogueConfig, SlotMergePolicy};
pub use settings::{
    apply_env_overrides, load_settings, load_settings_from, AdminConfig, MailConfig,
    ObservabilityConfig, PersistenceConfig, RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
