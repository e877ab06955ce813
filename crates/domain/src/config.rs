//! Environment-driven configuration structures shared by all binaries.

use std::env;

use thiserror::Error;

/// Configuration name looked up when `RELAY_CONFIG_NAME` is not set.
pub const DEFAULT_CONFIG_NAME: &str = "Demo - Endpoint Addresses";

/// Settings every relay entry point needs: where the records live, which
/// configuration entry to read and which environment the caller runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    record_store_url: String,
    record_store_token: Option<String>,
    config_name: String,
    current_environment: String,
}

impl RelayConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// required process variables. Missing entries surface as `ConfigError`
    /// so binaries can respond gracefully.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            record_store_url: get_required_var("RECORD_STORE_URL")?,
            record_store_token: get_optional_var("RECORD_STORE_TOKEN"),
            config_name: get_optional_var("RELAY_CONFIG_NAME")
                .unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string()),
            current_environment: get_required_var("RELAY_CURRENT_ENVIRONMENT")?,
        })
    }

    pub fn record_store_url(&self) -> &str {
        &self.record_store_url
    }

    pub fn record_store_token(&self) -> Option<&str> {
        self.record_store_token.as_deref()
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn current_environment(&self) -> &str {
        &self.current_environment
    }

    /// Overrides the configuration name, e.g. from a CLI flag.
    pub fn with_config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self
    }
}

/// API-specific configuration: the relay settings plus the HTTP bind target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    relay: RelayConfig,
    api_bind_address: String,
    api_unix_socket: Option<String>,
}

impl ApiConfig {
    /// Loads the relay settings plus the variables required by the API binary.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let relay = RelayConfig::load_from_env()?;

        Ok(Self {
            relay,
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
            api_unix_socket: get_optional_var("API_UNIX_SOCKET"),
        })
    }

    pub fn relay(&self) -> &RelayConfig {
        &self.relay
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }

    pub fn api_unix_socket(&self) -> Option<&str> {
        self.api_unix_socket.as_deref()
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::MissingVar { key })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Err(ConfigError::MissingVar { key }),
    }
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("ENDPOINT_RELAY_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}
