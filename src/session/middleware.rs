//! Session middleware: cookie → `Session` handle in request extensions.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::session::cookie::read_cookie;
use crate::session::store::SessionStore;
use crate::session::types::{SessionData, SessionId};

/// Per-request handle to the caller's session.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    store: SessionStore,
}

impl Session {
    pub fn new(id: SessionId, store: SessionStore) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Snapshot of the session data; empty if the session is gone.
    pub fn data(&self) -> SessionData {
        self.store.load(&self.id).unwrap_or_default()
    }

    /// Mutate the session data in place; `None` once the session is gone.
    pub fn update<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut SessionData) -> R,
    {
        self.store.update(&self.id, f)
    }

    /// Remove the session from the store.
    pub fn destroy(&self) {
        self.store.remove(&self.id);
    }
}

/// Attach a session to every request, creating one when the cookie is absent
/// or stale. New sessions get a `Set-Cookie` on the response unless the
/// handler destroyed them.
pub async fn session_middleware(
    State(store): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = read_cookie(request.headers(), store.cookie().name())
        .map(SessionId::from)
        .filter(|id| store.contains(id));

    let (id, is_new) = match existing {
        Some(id) => (id, false),
        None => (store.create(), true),
    };

    request
        .extensions_mut()
        .insert(Session::new(id.clone(), store.clone()));

    let mut response = next.run(request).await;

    if is_new && store.contains(&id) {
        match HeaderValue::from_str(&store.cookie().session_cookie(id.as_str())) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode session cookie"),
        }
    }

    response
}
