//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the Xero application credentials
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that every endpoint is a parseable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::BridgeConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value is absent or empty.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// A URL-valued setting does not parse.
    #[error("`{field}` is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    /// A numeric setting is out of range.
    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },
}

/// Validate the configuration, collecting every error found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let xero = &config.xero;

    for (field, value) in [
        ("xero.client_id", &xero.client_id),
        ("xero.client_secret", &xero.client_secret),
        ("xero.redirect_uri", &xero.redirect_uri),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::Missing(field));
        }
    }

    if xero.scopes.iter().all(|s| s.trim().is_empty()) {
        errors.push(ValidationError::Missing("xero.scopes"));
    }

    let urls = [
        ("xero.redirect_uri", &xero.redirect_uri),
        ("xero.authorize_url", &xero.authorize_url),
        ("xero.token_url", &xero.token_url),
        ("xero.connections_url", &xero.connections_url),
        ("xero.api_base_url", &xero.api_base_url),
    ];
    for (field, value) in urls {
        // Empty values were already reported as missing.
        if !value.is_empty() && Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::Zero { field: "listener.port" });
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::Zero { field: "session.ttl_secs" });
    }
    if config.session.anonymous_ttl_secs == 0 {
        errors.push(ValidationError::Zero { field: "session.anonymous_ttl_secs" });
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "session.sweep_interval_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.upstream_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.xero.client_id = "client".into();
        config.xero.client_secret = "secret".into();
        config.xero.redirect_uri = "http://localhost:5000/callback".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_credentials_all_reported() {
        let errors = validate_config(&BridgeConfig::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::Missing("xero.client_id")));
        assert!(errors.contains(&ValidationError::Missing("xero.client_secret")));
        assert!(errors.contains(&ValidationError::Missing("xero.redirect_uri")));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_bad_redirect_uri() {
        let mut config = valid_config();
        config.xero.redirect_uri = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidUrl {
                field: "xero.redirect_uri",
                value: "not a url".into(),
            }]
        );
    }

    #[test]
    fn test_zero_values() {
        let mut config = valid_config();
        config.listener.port = 0;
        config.session.ttl_secs = 0;
        config.session.anonymous_ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[2].to_string().contains("session.anonymous_ttl_secs"));
        assert!(errors[0].to_string().contains("listener.port"));
    }

    #[test]
    fn test_empty_scopes() {
        let mut config = valid_config();
        config.xero.scopes = vec![];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Missing("xero.scopes")]);
    }
}
