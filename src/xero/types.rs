//! Accounting API error definitions.

use axum::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::oauth::OAuthError;

/// Errors that can occur while serving a data route.
#[derive(Debug, Error)]
pub enum XeroError {
    /// The session has no token set.
    #[error("not authenticated: connect to Xero first")]
    NotAuthenticated,

    /// The session has a token set but no active tenant.
    #[error("no active tenant selected")]
    NoActiveTenant,

    /// Transport-level failure reaching the accounting API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The accounting API answered with a non-success status.
    #[error("Xero API returned status {status}")]
    Api { status: u16, body: Value },

    /// A successful response lacked the expected top-level field.
    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),

    /// The remote data needed to build a request is absent.
    #[error("{0}")]
    Precondition(String),

    /// Token refresh or other identity failure.
    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

impl XeroError {
    /// Short machine-readable kind used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            XeroError::NotAuthenticated => "not_authenticated",
            XeroError::NoActiveTenant => "no_active_tenant",
            XeroError::Http(_) => "upstream_unreachable",
            XeroError::Api { .. } => "upstream_error",
            XeroError::MissingField(_) => "unexpected_response",
            XeroError::Precondition(_) => "precondition_failed",
            XeroError::OAuth(_) => "oauth_error",
        }
    }

    /// HTTP status the bridge answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            XeroError::NotAuthenticated
            | XeroError::NoActiveTenant
            | XeroError::OAuth(OAuthError::NoRefreshToken) => StatusCode::UNAUTHORIZED,
            XeroError::Precondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            XeroError::Http(_)
            | XeroError::Api { .. }
            | XeroError::MissingField(_)
            | XeroError::OAuth(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Serialize the error as a JSON object.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let XeroError::Api { status, body: detail } = self {
            body["status"] = json!(status);
            body["detail"] = detail.clone();
        }
        body
    }
}

/// Result type for accounting operations.
pub type XeroResult<T> = Result<T, XeroError>;
