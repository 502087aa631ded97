//! Visitor sessions
//!
//! Each browser gets a random session id in a cookie; the id keys that visitor's
//! [`Funnel`] in memory. Nothing is persisted: sessions die with the process or
//! after sitting idle.

use axum::http::{header, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Funnel;

pub const SESSION_COOKIE: &str = "tla_session";

/// Idle time after which a session is dropped
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

struct SessionEntry {
    funnel: Funnel,
    last_seen: Instant,
}

/// In-memory funnel per visitor
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the visitor's session, creating a fresh one when the id is absent
    /// or unknown
    ///
    /// Returns the id and whether it was newly created.
    pub async fn resolve(&self, id: Option<Uuid>) -> (Uuid, bool) {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, false);
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionEntry {
                funnel: Funnel::new(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(session = %id, "Session created");
        (id, true)
    }

    /// Run `f` against the session's funnel under the write lock
    ///
    /// Returns `None` when the session no longer exists.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Funnel) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(f(&mut entry.funnel))
    }

    /// Copy of the session's funnel
    pub async fn get(&self, id: Uuid) -> Option<Funnel> {
        self.sessions.read().await.get(&id).map(|e| e.funnel.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many were dropped
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        before - sessions.len()
    }

    /// Periodically purge idle sessions
    pub fn spawn_reaper(&self, every: Duration, max_idle: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let purged = store.purge_idle(max_idle).await;
                if purged > 0 {
                    tracing::info!(purged, "Idle sessions dropped");
                }
            }
        })
    }
}

/// Session id from the request's `Cookie` header
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session id
pub fn session_cookie(id: Uuid) -> HeaderValue {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    // A UUID and fixed attributes are always valid header characters
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("tla_session=; Path=/"))
}
