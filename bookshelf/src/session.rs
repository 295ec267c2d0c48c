//! Cookie-identified client sessions carrying one-shot flash messages.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};
use mea::rwlock::RwLock;
use serde::Serialize;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "bookshelf.sid";

const SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Messages waiting to be shown on the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct FlashEntry {
    flash: Flash,
    created: Instant,
}

/// Process-local flash messages, keyed by session.
///
/// Entries live no longer than the session cookie. Expired entries are dropped
/// whenever the store is written.
#[derive(Debug, Clone)]
pub struct FlashStore {
    entries: Arc<RwLock<HashMap<Uuid, FlashEntry>>>,
    ttl: Duration,
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(SESSION_MAX_AGE_SECS))
    }
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    fn purge(&self, entries: &mut HashMap<Uuid, FlashEntry>) {
        entries.retain(|_, entry| entry.created.elapsed() < self.ttl);
    }

    async fn update(&self, session: Uuid, apply: impl FnOnce(&mut Flash)) {
        let mut entries = self.entries.write().await;
        self.purge(&mut entries);

        let entry = entries.entry(session).or_insert_with(|| FlashEntry {
            flash: Flash::default(),
            created: Instant::now(),
        });
        apply(&mut entry.flash);
    }

    /// Removes and returns the pending messages of a session.
    pub async fn take(&self, session: Uuid) -> Flash {
        let mut entries = self.entries.write().await;
        self.purge(&mut entries);

        entries
            .remove(&session)
            .map(|entry| entry.flash)
            .unwrap_or_default()
    }

    pub async fn holds(&self, session: Uuid) -> bool {
        self.entries
            .read()
            .await
            .get(&session)
            .is_some_and(|entry| entry.created.elapsed() < self.ttl)
    }
}

/// The session of the current request.
///
/// Inserted into the request extensions by [`session_layer`].
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    store: FlashStore,
}

impl Session {
    pub fn new(id: Uuid, store: FlashStore) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn flash_success(&self, message: impl Into<String>) {
        let message = message.into();
        self.store.update(self.id, |flash| flash.success = Some(message)).await;
    }

    pub async fn flash_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.store.update(self.id, |flash| flash.error = Some(message)).await;
    }

    /// Reads the pending messages once; they are gone afterwards.
    pub async fn take_flash(&self) -> Flash {
        self.store.take(self.id).await
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("Session requested on a route without the session layer");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

/// Reads the session id from the request cookies.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; Max-Age={SESSION_MAX_AGE_SECS}; HttpOnly; SameSite=Lax")
}

/// Attaches a [`Session`] to every request and issues the cookie once a new session has
/// something stored.
pub async fn session_layer(State(store): State<FlashStore>, mut request: Request, next: Next) -> Response {
    let (id, fresh) = match session_id(request.headers()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    };

    request.extensions_mut().insert(Session::new(id, store.clone()));
    let mut response = next.run(request).await;

    if fresh && store.holds(id).await {
        if let Ok(cookie) = HeaderValue::from_str(&session_cookie(id)) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_flash_is_read_once() {
        let session = Session::new(Uuid::new_v4(), FlashStore::new());

        session.flash_success("saved").await;
        session.flash_error("but also failed").await;

        assert_eq!(
            session.take_flash().await,
            Flash { success: Some("saved".into()), error: Some("but also failed".into()) }
        );
        assert_eq!(session.take_flash().await, Flash::default());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = FlashStore::new();
        let first = Session::new(Uuid::new_v4(), store.clone());
        let second = Session::new(Uuid::new_v4(), store.clone());

        first.flash_error("only mine").await;

        assert_eq!(second.take_flash().await, Flash::default());
        assert!(store.holds(first.id()).await);
        assert!(!store.holds(second.id()).await);
    }

    #[tokio::test]
    async fn test_expired_flash_is_dropped() {
        let store = FlashStore::with_ttl(Duration::from_millis(20));
        let stale = Session::new(Uuid::new_v4(), store.clone());
        stale.flash_error("Book not found").await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        let fresh = Session::new(Uuid::new_v4(), store.clone());
        fresh.flash_success("saved").await;

        assert!(!store.holds(stale.id()).await);
        assert_eq!(store.entries.read().await.len(), 1);
        assert_eq!(stale.take_flash().await, Flash::default());
        assert_eq!(fresh.take_flash().await.success.as_deref(), Some("saved"));
        assert!(store.entries.read().await.is_empty());
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; other=1")).unwrap(),
        );

        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_session_id_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("bookshelf.sid=not-a-uuid"));

        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let id = Uuid::nil();

        assert_eq!(
            session_cookie(id),
            "bookshelf.sid=00000000-0000-0000-0000-000000000000; Path=/; Max-Age=86400; HttpOnly; SameSite=Lax"
        );
    }
}
