//! Shared server state and per-browser sessions
//!
//! Each browser is identified by a UUID held in the `margie_session` cookie
//! and owns one [`Assistant`]. Sessions never share history. Only the page
//! itself opens a session; API calls without a known cookie never create one.
//!
//! Within a session the assistant sits behind an async mutex. Submissions use
//! `try_lock` so that a second question is refused instead of queued, while
//! reads are served from a transcript copy that an in-flight turn never
//! blocks.
//!
//! The store is bounded: sessions idle longer than the configured timeout are
//! dropped, and when the cap is reached the least recently used one goes.

use crate::agent::Assistant;
use crate::providers::{Message, Provider};
use crate::rag::Composer;
use axum::http::{header::COOKIE, HeaderMap};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "margie_session";

/// Sessions idle longer than this are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Upper bound on live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// One browser's assistant plus the transcript last published from it
pub struct SessionSlot {
    pub assistant: Mutex<Assistant>,
    transcript: RwLock<Vec<Message>>,
}

impl SessionSlot {
    fn new(assistant: Assistant) -> Self {
        let transcript = assistant.conversation().snapshot().to_vec();
        Self {
            assistant: Mutex::new(assistant),
            transcript: RwLock::new(transcript),
        }
    }

    /// History as of the last completed turn
    pub async fn transcript(&self) -> Vec<Message> {
        self.transcript.read().await.clone()
    }

    /// Makes the assistant's current history visible to readers
    pub async fn publish(&self, assistant: &Assistant) {
        *self.transcript.write().await = assistant.conversation().snapshot().to_vec();
    }
}

/// Session slot shared between the store and in-flight handlers
pub type SharedSession = Arc<SessionSlot>;

/// Session resolved for one request
pub struct Session {
    pub id: Uuid,
    pub slot: SharedSession,
    /// True when this request opened the session
    pub created: bool,
}

impl Session {
    /// `Set-Cookie` value binding the browser to this session
    pub fn cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        )
    }
}

struct Entry {
    slot: SharedSession,
    last_seen: Instant,
}

/// In-memory map from session id to session slot
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that drops sessions idle for `idle_timeout` and keeps at most
    /// `max_sessions` (never less than one)
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Looks up a live session and marks it as used
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        let expired = match sessions.get_mut(&id) {
            Some(entry) if now.duration_since(entry.last_seen) < self.idle_timeout => {
                entry.last_seen = now;
                return Some(entry.slot.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(&id);
            tracing::debug!("Session {} expired", id);
        }
        None
    }

    /// Stores a new session, evicting idle and then least recently used ones
    pub async fn insert(&self, id: Uuid, assistant: Assistant) -> SharedSession {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        if sessions.len() < before {
            tracing::debug!("Dropped {} idle sessions", before - sessions.len());
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::info!("Session limit reached, evicted {}", oldest);
                }
                None => break,
            }
        }

        let slot = Arc::new(SessionSlot::new(assistant));
        sessions.insert(
            id,
            Entry {
                slot: slot.clone(),
                last_seen: now,
            },
        );
        slot
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

/// Application state shared by every handler
pub struct AppState {
    provider: Arc<dyn Provider>,
    composer: Arc<Composer>,
    system_prompt: String,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn Provider>,
        composer: Arc<Composer>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            composer,
            system_prompt: system_prompt.into(),
            sessions: SessionStore::new(),
        }
    }

    /// Replaces the session store, typically to apply configured limits
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Session named by the request's cookie, if it is still live
    pub async fn find_session(&self, headers: &HeaderMap) -> Option<Session> {
        let id = session_id(headers)?;
        let slot = self.sessions.get(id).await?;
        Some(Session {
            id,
            slot,
            created: false,
        })
    }

    /// Session named by the request's cookie, or a freshly opened one
    ///
    /// An unknown, expired or malformed id opens a new session under a new id.
    pub async fn open_session(&self, headers: &HeaderMap) -> Session {
        if let Some(session) = self.find_session(headers).await {
            return session;
        }

        let id = Uuid::new_v4();
        let assistant = Assistant::new(
            self.provider.clone(),
            self.composer.clone(),
            self.system_prompt.clone(),
        );
        let slot = self.sessions.insert(id, assistant).await;
        tracing::info!("Created session {}", id);

        Session {
            id,
            slot,
            created: true,
        }
    }

    /// History shown to a browser that has no session yet
    pub fn blank_transcript(&self) -> Vec<Message> {
        vec![Message::system(self.system_prompt.clone())]
    }
}

/// Extracts the session id from the `Cookie` headers, if any
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
