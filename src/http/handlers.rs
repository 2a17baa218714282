//! Route handlers.
//!
//! Browser routes (`/`, `/connect`, `/callback`, `/organisation`, `/logout`)
//! answer with HTML or redirects. Data routes answer with the projected
//! Xero collection as JSON.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::Value;

use crate::http::response::{failure_page, ApiResult};
use crate::http::server::AppState;
use crate::oauth::{CallbackParams, OAuthError, OAuthResult};
use crate::observability::metrics;
use crate::session::Session;
use crate::xero::models::{sample_contact, sample_invoice};
use crate::xero::{first_id, XeroError, XeroResult, SALES_ACCOUNTS_FILTER};

const STATE_LEN: usize = 32;

fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

pub async fn index() -> Html<&'static str> {
    Html("<a href='/connect'>Connect to Xero</a>")
}

/// Redirect the browser to Xero's consent screen.
pub async fn connect(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    let oauth_state = generate_state();
    let url = match state.oauth.consent_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => return failure_page("connect", e),
    };
    if session
        .update(|data| data.oauth_state = Some(oauth_state))
        .is_none()
    {
        return failure_page("connect", OAuthError::SessionEnded);
    }
    metrics::record_oauth_event("connect");
    Redirect::to(&url).into_response()
}

/// Finish the authorization-code flow and select tenant 0.
pub async fn callback(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_callback(&state, &session, &params).await {
        Ok(()) => {
            metrics::record_oauth_event("callback_success");
            Redirect::to("/organisation").into_response()
        }
        Err(e) => {
            metrics::record_oauth_event("callback_failure");
            failure_page("callback", e)
        }
    }
}

async fn complete_callback(
    state: &AppState,
    session: &Session,
    params: &CallbackParams,
) -> OAuthResult<()> {
    // The issued state is single-use.
    let expected = session.update(|data| data.oauth_state.take()).flatten();
    match (expected.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return Err(OAuthError::StateMismatch),
    }

    let authorized = state.oauth.complete_callback(params).await?;

    tracing::info!(
        session = %session.id(),
        tenants = authorized.tenants.len(),
        active_tenant = ?authorized.tenants.first().map(|t| t.tenant_id.as_str()),
        subject = ?authorized.decoded_id_token.get("sub"),
        "Xero authorization completed"
    );

    // A logout during the exchange wins; the tokens are dropped.
    session
        .update(|data| data.apply_authorization(authorized))
        .ok_or(OAuthError::SessionEnded)
}

/// Greet the active tenant's organisation by name.
pub async fn organisation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    match organisation_name(&state, &session).await {
        Ok(name) => format!("Hello, {}", name).into_response(),
        Err(e) => failure_page("organisation", e),
    }
}

async fn organisation_name(state: &AppState, session: &Session) -> XeroResult<String> {
    if let Some(token_set) = session.data().token_set {
        tracing::info!(
            token = if token_set.expired() { "expired" } else { "valid" },
            "Token set status"
        );
    }

    let auth = state.authorize(session).await?;
    let organisations = state.accounting.get_organisations(&auth).await?;
    organisations
        .get(0)
        .and_then(|org| org.get("Name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(XeroError::MissingField("Organisations[0].Name"))
}

pub async fn get_contacts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.get_contacts(&auth).await?))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.create_contacts(&auth, &sample_contact()).await?))
}

pub async fn get_invoices(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.get_invoices(&auth).await?))
}

/// Invoice the first contact against the first active sales account.
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;

    let contacts = state.accounting.get_contacts(&auth).await?;
    let contact_id = first_id(&contacts, "ContactID")
        .ok_or_else(|| XeroError::Precondition("no contact available to invoice".into()))?;

    let accounts = state
        .accounting
        .get_accounts(&auth, Some(SALES_ACCOUNTS_FILTER))
        .await?;
    let account_id = first_id(&accounts, "AccountID")
        .ok_or_else(|| XeroError::Precondition("no active sales account".into()))?;

    let invoices = sample_invoice(contact_id, account_id, Utc::now().date_naive());
    Ok(Json(state.accounting.create_invoices(&auth, &invoices).await?))
}

pub async fn get_bank_transactions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.get_bank_transactions(&auth).await?))
}

pub async fn get_payment_history(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.get_payment_history(&auth).await?))
}

pub async fn get_reports(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.get_reports_list(&auth).await?))
}

pub async fn get_ten_ninety_nine(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult {
    let auth = state.authorize(&session).await?;
    Ok(Json(state.accounting.get_report_ten_ninety_nine(&auth).await?))
}

/// Destroy the session and send the browser home.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    session.destroy();
    metrics::record_oauth_event("logout");
    tracing::info!(session = %session.id(), "Session destroyed");

    let mut response = Redirect::to("/").into_response();
    if let Ok(value) = HeaderValue::from_str(&state.sessions.cookie().expired_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}
