//! Xero identity client: consent URL, code exchange, refresh, tenant listing.
//!
//! # Responsibilities
//! - Build the consent URL for the authorization-code flow
//! - Exchange the callback code for a token set
//! - Refresh expired access tokens
//! - List the organisations (tenants) the token can act on

use std::time::Instant;

use url::Url;

use crate::config::XeroConfig;
use crate::observability::metrics;
use crate::oauth::token::decode_claims;
use crate::oauth::types::{
    AuthorizedSession, CallbackParams, OAuthError, OAuthResult, Tenant, TokenResponse, TokenSet,
};

/// OAuth2 client bound to one Xero application.
#[derive(Clone)]
pub struct XeroOAuthClient {
    config: XeroConfig,
    http: reqwest::Client,
}

impl XeroOAuthClient {
    /// Create a client for the given application, sharing `http`.
    pub fn new(config: XeroConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// The application configuration.
    pub fn config(&self) -> &XeroConfig {
        &self.config
    }

    /// Build the URL the browser is sent to for consent.
    pub fn consent_url(&self, state: &str) -> OAuthResult<String> {
        if self.config.client_id.is_empty() {
            return Err(OAuthError::InvalidConfig("client id is not set".into()));
        }
        if self.config.redirect_uri.is_empty() {
            return Err(OAuthError::InvalidConfig("redirect URI is not set".into()));
        }

        let mut url = Url::parse(&self.config.authorize_url).map_err(|e| {
            OAuthError::InvalidConfig(format!(
                "authorize URL '{}' is invalid: {}",
                self.config.authorize_url, e
            ))
        })?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);

        Ok(url.into())
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> OAuthResult<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.token_request("token_exchange", &params).await
    }

    /// Obtain a new access token using a refresh token.
    ///
    /// The original refresh token is kept when the response does not rotate it.
    pub async fn refresh(&self, refresh_token: &str) -> OAuthResult<TokenSet> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let mut token_set = self.token_request("token_refresh", &params).await?;
        if token_set.refresh_token.is_none() {
            token_set.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token_set)
    }

    async fn token_request(
        &self,
        operation: &'static str,
        params: &[(&str, &str)],
    ) -> OAuthResult<TokenSet> {
        let start = Instant::now();
        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        metrics::record_upstream_call(operation, status.as_u16(), start);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into_token_set())
    }

    /// List connected tenants, most recently updated first.
    pub async fn fetch_tenants(&self, access_token: &str) -> OAuthResult<Vec<Tenant>> {
        let start = Instant::now();
        let response = self
            .http
            .get(&self.config.connections_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        metrics::record_upstream_call("connections", status.as_u16(), start);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Connections {
                status: status.as_u16(),
                body,
            });
        }

        let mut tenants: Vec<Tenant> = response.json().await?;
        sort_most_recent_first(&mut tenants);
        Ok(tenants)
    }

    /// Run the callback leg of the flow: exchange, list tenants, decode tokens.
    pub async fn complete_callback(&self, params: &CallbackParams) -> OAuthResult<AuthorizedSession> {
        if let Some(error) = &params.error {
            let detail = params
                .error_description
                .as_deref()
                .map(|d| format!("{}: {}", error, d))
                .unwrap_or_else(|| error.clone());
            return Err(OAuthError::AuthorizationDenied(detail));
        }
        let code = params.code.as_deref().filter(|c| !c.is_empty()).ok_or(OAuthError::MissingCode)?;

        let token_set = self.exchange_code(code).await?;
        let tenants = self.fetch_tenants(&token_set.access_token).await?;
        if tenants.is_empty() {
            return Err(OAuthError::NoTenants);
        }

        let id_token = token_set
            .id_token
            .as_deref()
            .ok_or_else(|| OAuthError::InvalidToken("token response has no id_token".into()))?;
        let decoded_id_token = decode_claims(id_token)?;
        let decoded_access_token = decode_claims(&token_set.access_token)?;

        Ok(AuthorizedSession {
            token_set,
            decoded_id_token,
            decoded_access_token,
            tenants,
        })
    }
}

impl std::fmt::Debug for XeroOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XeroOAuthClient")
            .field("client_id", &self.config.client_id)
            .field("token_url", &self.config.token_url)
            .finish()
    }
}

/// Order tenants so the most recently updated connection comes first.
///
/// Xero timestamps share one fixed-width format, so they compare lexically.
/// Tenants without a timestamp sort last; ties keep their original order.
fn sort_most_recent_first(tenants: &mut [Tenant]) {
    tenants.sort_by(|a, b| {
        let a = a.updated_date_utc.as_deref().or(a.created_date_utc.as_deref());
        let b = b.updated_date_utc.as_deref().or(b.created_date_utc.as_deref());
        b.cmp(&a)
    });
}
