use axum::extract::State;
use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::error::ApiError;
use super::state::{AppState, Session};

const PAGE: &str = include_str!("page.html");

#[derive(Debug, Deserialize)]
pub struct PostMessage {
    pub content: String,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Serves the page, opening a session when the browser has none
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = state.open_session(&headers).await;
    with_session_cookie(Html(PAGE).into_response(), &session)
}

/// History for the caller's session, or just the system message without one
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let messages = match state.find_session(&headers).await {
        Some(session) => session.slot.transcript().await,
        None => state.blank_transcript(),
    };
    Json(json!({ "messages": messages }))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<PostMessage>,
) -> Result<Response, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Please enter a question.".to_string()));
    }

    let session = state
        .find_session(&headers)
        .await
        .ok_or_else(ApiError::no_session)?;
    let mut assistant = session.slot.assistant.try_lock().map_err(|_| {
        tracing::warn!("Session {} is busy, rejecting submission", session.id);
        ApiError::busy()
    })?;

    tracing::debug!("Session {} asking a question", session.id);
    let reply = assistant.ask(&payload.content).await.map_err(|e| {
        tracing::error!("Session {} failed to get an answer: {}", session.id, e);
        ApiError::from(e)
    })?;
    session.slot.publish(&assistant).await;

    let body = Json(json!({
        "reply": reply,
        "messages": assistant.conversation().snapshot(),
    }));
    drop(assistant);
    with_session_cookie(body.into_response(), &session)
}

fn with_session_cookie(mut response: Response, session: &Session) -> Result<Response, ApiError> {
    if session.created {
        let cookie = HeaderValue::from_str(&session.cookie()).map_err(ApiError::internal)?;
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    Ok(response)
}
