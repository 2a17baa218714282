//! Token, tenant, and error types for the Xero identity flow.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the Xero identity service.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Client configuration is unusable (empty id, malformed URL).
    #[error("OAuth client misconfigured: {0}")]
    InvalidConfig(String),

    /// Transport-level failure reaching the identity service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the request.
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    /// The connections endpoint rejected the request.
    #[error("connections endpoint returned {status}: {body}")]
    Connections { status: u16, body: String },

    /// The user declined consent or the provider reported an error.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The callback carried no authorization code.
    #[error("callback is missing the authorization code")]
    MissingCode,

    /// The callback `state` does not match the one issued by `/connect`.
    #[error("callback state does not match the session")]
    StateMismatch,

    /// A token could not be decoded as a JWT.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token set has no refresh token.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The browser session ended while the flow was in progress.
    #[error("session ended before authorization completed")]
    SessionEnded,

    /// The authorization produced no connected organisations.
    #[error("no tenants are connected to this authorization")]
    NoTenants,
}

/// Result type for OAuth operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Token material issued by the authorization server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub token_type: String,
    pub scope: Option<String>,
    /// Absolute expiry, seconds since the unix epoch.
    pub expires_at: Option<i64>,
}

impl TokenSet {
    /// Whether the access token has passed its expiry.
    ///
    /// A token set without an expiry never reports expired.
    pub fn expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at <= Utc::now().timestamp())
    }
}

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Convert into a token set, anchoring `expires_in` to now.
    pub(crate) fn into_token_set(self) -> TokenSet {
        TokenSet {
            // Negative lifetimes count as already expired; huge ones saturate.
            expires_at: self
                .expires_in
                .map(|secs| Utc::now().timestamp().saturating_add(secs.max(0))),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            id_token: self.id_token,
            token_type: self.token_type,
            scope: self.scope,
        }
    }
}

/// A connected organisation, as listed by the connections endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Connection id.
    pub id: String,
    pub tenant_id: String,
    pub tenant_type: String,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub created_date_utc: Option<String>,
    #[serde(default)]
    pub updated_date_utc: Option<String>,
    /// Remaining connection fields (e.g. `authEventId`), kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Query parameters delivered to `/callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Everything produced by a successful callback.
#[derive(Debug, Clone)]
pub struct AuthorizedSession {
    pub token_set: TokenSet,
    pub decoded_id_token: serde_json::Value,
    pub decoded_access_token: serde_json::Value,
    /// Most recently updated first.
    pub tenants: Vec<Tenant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_set(expires_at: Option<i64>) -> TokenSet {
        TokenSet {
            access_token: "a".into(),
            refresh_token: None,
            id_token: None,
            token_type: "Bearer".into(),
            scope: None,
            expires_at,
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now().timestamp();
        assert!(token_set(Some(now - 1)).expired());
        assert!(!token_set(Some(now + 1800)).expired());
        assert!(!token_set(None).expired());
    }

    #[test]
    fn test_token_response_conversion() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"at","refresh_token":"rt","expires_in":1800,"token_type":"Bearer"}"#,
        )
        .unwrap();
        let before = Utc::now().timestamp();
        let set = response.into_token_set();
        assert_eq!(set.access_token, "at");
        assert_eq!(set.refresh_token.as_deref(), Some("rt"));
        let expires_at = set.expires_at.unwrap();
        assert!(expires_at >= before + 1800 && expires_at <= before + 1801);
    }

    #[test]
    fn test_tenant_wire_format() {
        let tenant: Tenant = serde_json::from_str(
            r#"{
                "id": "conn-1",
                "authEventId": "evt",
                "tenantId": "tenant-1",
                "tenantType": "ORGANISATION",
                "tenantName": "Demo Company (US)",
                "createdDateUtc": "2024-01-01T00:00:00.0000000",
                "updatedDateUtc": "2024-02-01T00:00:00.0000000"
            }"#,
        )
        .unwrap();
        assert_eq!(tenant.tenant_id, "tenant-1");
        assert_eq!(tenant.tenant_name.as_deref(), Some("Demo Company (US)"));
        assert_eq!(tenant.extra["authEventId"], "evt");

        let round_trip = serde_json::to_value(&tenant).unwrap();
        assert_eq!(round_trip["authEventId"], "evt");
        assert_eq!(round_trip["tenantId"], "tenant-1");
    }

    #[test]
    fn test_token_response_extreme_lifetimes() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"at","expires_in":9223372036854775807}"#,
        )
        .unwrap();
        let set = response.into_token_set();
        assert_eq!(set.expires_at, Some(i64::MAX));
        assert!(!set.expired());

        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"at","expires_in":-60}"#).unwrap();
        let before = Utc::now().timestamp();
        let set = response.into_token_set();
        assert!(set.expires_at.unwrap() <= before + 1);
        assert!(set.expired());
    }
}
