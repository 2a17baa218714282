//! Shared utilities for the route-level integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xero_oauth_bridge::config::{BridgeConfig, XeroConfig};
use xero_oauth_bridge::http::AppState;
use xero_oauth_bridge::oauth::{Tenant, TokenSet};
use xero_oauth_bridge::session::{SessionData, SessionId};
use xero_oauth_bridge::HttpServer;

pub const API_PREFIX: &str = "/api.xro/2.0";

/// Config whose identity and accounting endpoints all point at `base`.
pub fn test_config(base: &str) -> BridgeConfig {
    BridgeConfig {
        xero: XeroConfig {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_uri: "http://localhost:5000/callback".into(),
            authorize_url: format!("{}/identity/connect/authorize", base),
            token_url: format!("{}/connect/token", base),
            connections_url: format!("{}/connections", base),
            api_base_url: format!("{}{}", base, API_PREFIX),
            ..XeroConfig::default()
        },
        ..BridgeConfig::default()
    }
}

/// Server, layered router, and shared state for one test.
pub fn start_bridge(config: BridgeConfig) -> (Router, AppState) {
    let server = HttpServer::new(config).unwrap();
    (server.router(), server.state().clone())
}

/// An unsigned JWT carrying `claims`.
pub fn fake_jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn tenant_json(tenant_id: &str, name: &str, updated: &str) -> Value {
    json!({
        "id": format!("conn-{}", tenant_id),
        "tenantId": tenant_id,
        "tenantType": "ORGANISATION",
        "tenantName": name,
        "createdDateUtc": "2022-01-01T00:00:00.0000000",
        "updatedDateUtc": updated,
    })
}

/// Mount the token endpoint for the authorization-code grant.
pub async fn mount_code_exchange(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "refresh_token": "refresh-1",
            "id_token": fake_jwt(json!({"sub": "user-1", "email": "owner@example.com"})),
            "token_type": "Bearer",
            "expires_in": 1800,
            "scope": "openid profile email",
        })))
        .mount(server)
        .await;
}

/// Mount the connections endpoint returning `tenants`.
pub async fn mount_connections(server: &MockServer, tenants: Value) {
    Mock::given(method("GET"))
        .and(path("/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tenants))
        .mount(server)
        .await;
}

pub fn token_set(access_token: &str, expires_at: Option<i64>) -> TokenSet {
    TokenSet {
        access_token: access_token.into(),
        refresh_token: Some("refresh-1".into()),
        id_token: None,
        token_type: "Bearer".into(),
        scope: None,
        expires_at,
    }
}

pub fn tenant(tenant_id: &str) -> Tenant {
    Tenant {
        id: format!("conn-{}", tenant_id),
        tenant_id: tenant_id.into(),
        tenant_type: "ORGANISATION".into(),
        tenant_name: Some("Demo".into()),
        created_date_utc: None,
        updated_date_utc: None,
        extra: Default::default(),
    }
}

/// Seed an authenticated session and return its `Cookie` header value.
pub fn authenticated_session(state: &AppState, token_set: TokenSet, tenant_id: &str) -> String {
    let id = state.sessions.create();
    state.sessions.save(
        &id,
        SessionData {
            token_set: Some(token_set),
            all_tenants: vec![tenant(tenant_id)],
            active_tenant: Some(tenant(tenant_id)),
            ..SessionData::default()
        },
    );
    format!("{}={}", state.sessions.cookie().name(), id)
}

pub fn session_data(state: &AppState, cookie: &str) -> Option<SessionData> {
    let (_, id) = cookie.split_once('=')?;
    state.sessions.load(&SessionId::from(id.to_string()))
}

/// Issue a GET through the full middleware stack.
pub async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(router, "GET", uri, cookie).await
}

pub async fn post(router: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(router, "POST", uri, cookie).await
}

async fn send(router: &Router, method: &str, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// The `name=value` pair of a live session cookie set on `response`.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| !v.contains("Max-Age=0"))
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with("xero_session="))
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
