//! Browser chat UI
//!
//! A single-page front end served by axum. Every browser gets its own
//! conversation, keyed by a session cookie that only the page itself issues.
//! The completion provider and request settings are shared by all sessions.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::router;
pub use state::{AppState, SessionStore, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS, SESSION_COOKIE};
