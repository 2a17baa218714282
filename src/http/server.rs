//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every bridge route
//! - Wire up middleware (sessions, tracing, timeout, request ID)
//! - Hold the shared identity and accounting clients
//! - Refresh expired access tokens before tenant-scoped calls
//! - Run the session sweeper alongside the server until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::BridgeConfig;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::oauth::{decode_claims, OAuthError, XeroOAuthClient};
use crate::observability::metrics;
use crate::session::{session_middleware, Session, SessionStore};
use crate::xero::{create_http_client, AccountingApi, TenantAuth, XeroError, XeroResult};

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<XeroOAuthClient>,
    pub accounting: Arc<AccountingApi>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Build the shared clients and an empty session store.
    pub fn new(config: &BridgeConfig) -> reqwest::Result<Self> {
        let http = create_http_client(&config.timeouts)?;
        Ok(Self {
            oauth: Arc::new(XeroOAuthClient::new(config.xero.clone(), http.clone())),
            accounting: Arc::new(AccountingApi::new(config.xero.api_base_url.clone(), http)),
            sessions: SessionStore::new(&config.session),
        })
    }

    /// Credentials for the session's active tenant.
    ///
    /// An expired access token is refreshed first and the new token set is
    /// written back to the session.
    pub async fn authorize(&self, session: &Session) -> XeroResult<TenantAuth> {
        let data = session.data();
        let auth = data.tenant_auth()?;
        let token_set = data.token_set.as_ref().ok_or(XeroError::NotAuthenticated)?;
        if !token_set.expired() {
            return Ok(auth);
        }

        let refresh_token = token_set
            .refresh_token
            .as_deref()
            .ok_or(OAuthError::NoRefreshToken)?;
        let refreshed = self.oauth.refresh(refresh_token).await?;
        let decoded = decode_claims(&refreshed.access_token).ok();

        metrics::record_oauth_event("token_refresh");
        tracing::info!(session = %session.id(), "Refreshed expired access token");

        session
            .update(|data| {
                data.token_set = Some(refreshed);
                if decoded.is_some() {
                    data.decoded_access_token = decoded;
                }
                data.tenant_auth()
            })
            .unwrap_or(Err(XeroError::NotAuthenticated))
    }
}

/// HTTP server for the bridge.
pub struct HttpServer {
    router: Router,
    config: BridgeConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BridgeConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config)?;
        let router = build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = self.state.sessions.clone();
        let sweep_interval = Duration::from_secs(self.config.session.sweep_interval_secs);
        let sweeper_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            sweeper.run_sweeper(sweep_interval, sweeper_shutdown).await;
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &BridgeConfig, state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/connect", get(handlers::connect))
        .route("/callback", get(handlers::callback))
        .route("/organisation", get(handlers::organisation))
        .route(
            "/contacts",
            get(handlers::get_contacts).post(handlers::create_contact),
        )
        .route(
            "/invoices",
            get(handlers::get_invoices).post(handlers::create_invoice),
        )
        .route("/bank-transactions", get(handlers::get_bank_transactions))
        .route("/payment-history", get(handlers::get_payment_history))
        .route("/reports", get(handlers::get_reports))
        .route("/reports/TenNinetyNine", get(handlers::get_ten_ninety_nine))
        .route("/logout", get(handlers::logout))
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
}
