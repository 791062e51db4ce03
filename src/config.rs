//! Configuration management for RAX Chat Server
//!
//! Values come from built-in defaults, an optional `config.toml`, and
//! `RAX_CHAT_*` environment overrides, in that order of precedence.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Complete server configuration, fixed for the lifetime of the process.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the chat listener
    pub bind_address: String,

    /// TCP port for client connections
    /// Environment: RAX_CHAT_PORT
    pub port: u16,

    /// Maximum concurrent connections
    /// Environment: RAX_CHAT_MAX_CLIENTS
    pub max_clients: usize,

    /// Seconds of inactivity after which a user is reported offline
    /// Environment: RAX_CHAT_IDLE_THRESHOLD_SECS
    pub idle_threshold_secs: u64,

    /// Longest accepted username, in bytes
    pub max_username_length: usize,

    /// Longest accepted request line, in bytes
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 9000,
            max_clients: 64,
            idle_threshold_secs: 60,
            max_username_length: 32,
            max_line_length: 4096,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = ServerConfig::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("idle_threshold_secs", defaults.idle_threshold_secs as i64)?
            .set_default("max_username_length", defaults.max_username_length as i64)?
            .set_default("max_line_length", defaults.max_line_length as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RAX_CHAT"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.idle_threshold_secs == 0 {
            return Err(config::ConfigError::Message(
                "idle_threshold_secs must be greater than 0".into(),
            ));
        }

        if self.max_username_length == 0 {
            return Err(config::ConfigError::Message(
                "max_username_length must be greater than 0".into(),
            ));
        }

        if self.max_line_length == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the idle threshold as Duration
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }
}
