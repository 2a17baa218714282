//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Scopes requested during the authorization-code flow.
pub const DEFAULT_SCOPES: &str = "openid profile email accounting.settings accounting.reports.read accounting.journals.read accounting.contacts accounting.attachments accounting.transactions offline_access";

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Xero application credentials and endpoints.
    pub xero: XeroConfig,

    /// Server-side session settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Bind address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Xero OAuth2 application and API endpoints.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct XeroConfig {
    /// OAuth client ID issued by the Xero developer portal.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Redirect URI registered for the app (points at `/callback`).
    pub redirect_uri: String,

    /// Scopes requested on the consent screen.
    pub scopes: Vec<String>,

    /// Authorization endpoint.
    pub authorize_url: String,

    /// Token endpoint.
    pub token_url: String,

    /// Connections (tenant list) endpoint.
    pub connections_url: String,

    /// Accounting API base URL.
    pub api_base_url: String,
}

impl Default for XeroConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scopes: DEFAULT_SCOPES.split(' ').map(str::to_string).collect(),
            authorize_url: "https://login.xero.com/identity/connect/authorize".to_string(),
            token_url: "https://identity.xero.com/connect/token".to_string(),
            connections_url: "https://api.xero.com/connections".to_string(),
            api_base_url: "https://api.xero.com/api.xro/2.0".to_string(),
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for XeroConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XeroConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("connections_url", &self.connections_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the cookie `Secure` (HTTPS only).
    pub cookie_secure: bool,

    /// Idle lifetime of an authenticated session in seconds.
    pub ttl_secs: u64,

    /// Idle lifetime of a session that has not completed the OAuth flow.
    pub anonymous_ttl_secs: u64,

    /// How often expired sessions are purged, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "xero_session".to_string(),
            cookie_secure: false,
            ttl_secs: 60 * 60 * 24,
            anonymous_ttl_secs: 60 * 10,
            sweep_interval_secs: 60,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Upstream request timeout in seconds.
    pub upstream_secs: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 20,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
