//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::BridgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override from the environment, and validate configuration.
///
/// A `.env` file in the working directory is honoured when present. With no
/// `path`, the defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    if let Ok(env_file) = dotenvy::dotenv() {
        tracing::debug!(path = ?env_file, "Loaded .env file");
    }

    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => BridgeConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML config file without validating it.
pub fn parse_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut BridgeConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("XERO_CLIENT_ID") {
        config.xero.client_id = v;
    }
    if let Some(v) = lookup("XERO_CLIENT_SECRET") {
        config.xero.client_secret = v;
    }
    if let Some(v) = lookup("XERO_REDIRECT_URI") {
        config.xero.redirect_uri = v;
    }
    if let Some(v) = lookup("XERO_SCOPES") {
        config.xero.scopes = v.split_whitespace().map(str::to_string).collect();
    }
    if let Some(v) = lookup("HOST") {
        config.listener.host = v;
    }
    if let Some(v) = lookup("PORT") {
        config.listener.port = v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { key: "PORT", value: v.clone() })?;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = lookup("LOG_FORMAT") {
        config.observability.log_format = v;
    }
    Ok(())
}
