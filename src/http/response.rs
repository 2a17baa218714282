//! Response shaping for the two route families.
//!
//! # Design Decisions
//! - Browser-facing routes answer any failure with one generic message
//! - JSON routes serialize the error object, never the token material
//! - Every failure is logged with the route name before it is rendered

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::xero::XeroError;

/// Body of every failed browser-facing route.
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong";

/// Log `error` and render the generic failure page.
pub fn failure_page(route: &'static str, error: impl Display) -> Response {
    tracing::error!(route = route, error = %error, "Request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(FAILURE_MESSAGE)).into_response()
}

/// Error half of a JSON route's result.
#[derive(Debug)]
pub struct ApiError(pub XeroError);

impl From<XeroError> for ApiError {
    fn from(error: XeroError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Upstream call failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.0.to_json())).into_response()
    }
}

/// Result type returned by JSON routes.
pub type ApiResult = Result<Json<Value>, ApiError>;
