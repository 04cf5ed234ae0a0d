use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Creates the chat UI router
///
/// Routes:
/// - `GET /` serves the page and issues the session cookie
/// - `GET /api/messages` returns the session's history
/// - `POST /api/messages` asks one question within an open session
/// - `GET /health` liveness probe
///
/// # Arguments
///
/// * `state` - Shared application state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/api/messages",
            get(handlers::get_messages).post(handlers::post_message),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
