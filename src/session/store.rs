//! In-memory session store with idle expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::session::cookie::CookieSettings;
use crate::session::types::{SessionData, SessionId};

struct SessionEntry {
    data: SessionData,
    expires_at: Instant,
}

/// A thread-safe map of session id -> session record.
///
/// Records expire after `ttl` without being read or written, or after the
/// shorter `anonymous_ttl` while they hold no token set. Expired records
/// are invisible to every accessor and are dropped when touched or swept.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, SessionEntry>>,
    ttl: Duration,
    anonymous_ttl: Duration,
    cookie: CookieSettings,
}

impl SessionStore {
    /// Create an empty store from the session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_ttl(
            Duration::from_secs(config.ttl_secs),
            CookieSettings::from_config(config),
        )
        .with_anonymous_ttl(Duration::from_secs(config.anonymous_ttl_secs))
    }

    /// Create an empty store with an explicit TTL.
    pub fn with_ttl(ttl: Duration, cookie: CookieSettings) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            anonymous_ttl: ttl,
            cookie,
        }
    }

    /// Expire unauthenticated sessions after `ttl` instead; never longer than
    /// the authenticated TTL.
    pub fn with_anonymous_ttl(mut self, ttl: Duration) -> Self {
        self.anonymous_ttl = ttl.min(self.ttl);
        self
    }

    fn idle_ttl(&self, data: &SessionData) -> Duration {
        if data.is_authenticated() {
            self.ttl
        } else {
            self.anonymous_ttl
        }
    }

    /// Cookie settings for this store's sessions.
    pub fn cookie(&self) -> &CookieSettings {
        &self.cookie
    }

    /// Create a new, empty session and return its id.
    pub fn create(&self) -> SessionId {
        let id = SessionId::generate();
        self.save(&id, SessionData::default());
        id
    }

    /// Whether a live session exists for `id`.
    pub fn contains(&self, id: &SessionId) -> bool {
        !self.evict_if_expired(id) && self.inner.contains_key(id)
    }

    /// Load a copy of the session data, refreshing its idle expiry.
    pub fn load(&self, id: &SessionId) -> Option<SessionData> {
        if self.evict_if_expired(id) {
            return None;
        }
        self.inner.get_mut(id).map(|mut entry| {
            entry.expires_at = Instant::now() + self.idle_ttl(&entry.data);
            entry.data.clone()
        })
    }

    /// Store `data` under `id`, replacing any previous record.
    pub fn save(&self, id: &SessionId, data: SessionData) {
        let expires_at = Instant::now() + self.idle_ttl(&data);
        self.inner.insert(id.clone(), SessionEntry { data, expires_at });
    }

    /// Mutate a live session in place, refreshing its idle expiry.
    ///
    /// Returns `None` without touching the map when the session is missing,
    /// expired, or destroyed.
    pub fn update<F, R>(&self, id: &SessionId, f: F) -> Option<R>
    where
        F: FnOnce(&mut SessionData) -> R,
    {
        if self.evict_if_expired(id) {
            return None;
        }
        self.inner.get_mut(id).map(|mut entry| {
            let result = f(&mut entry.data);
            entry.expires_at = Instant::now() + self.idle_ttl(&entry.data);
            result
        })
    }

    /// Destroy a session. Returns whether a record was removed.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.inner.remove(id).is_some()
    }

    /// Drop every expired record, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.inner.len())
    }

    /// Number of records held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn evict_if_expired(&self, id: &SessionId) -> bool {
        let now = Instant::now();
        self.inner
            .remove_if(id, |_, entry| entry.expires_at <= now)
            .is_some()
    }

    /// Periodically purge expired sessions until shutdown.
    pub async fn run_sweeper(self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = interval.as_secs(), "Session sweeper starting");
        let mut ticker = time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = self.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining = self.len(), "Purged expired sessions");
                    }
                    metrics::record_active_sessions(self.len());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.inner.len())
            .field("ttl", &self.ttl)
            .field("anonymous_ttl", &self.anonymous_ttl)
            .finish()
    }
}
