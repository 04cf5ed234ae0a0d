use crate::error::MargieError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the chat UI endpoints as `{"error": "..."}` bodies
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream failure: {0}")]
    BadGateway(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    /// Rejection for a submission without a live session cookie
    pub fn no_session() -> Self {
        ApiError::NotFound("No active session, reload the page".to_string())
    }

    /// Rejection for a second submission while one is still being answered
    pub fn busy() -> Self {
        ApiError::Conflict("A question is already being answered for this session".to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<MargieError>() {
            Some(MargieError::EmptyInput) | Some(MargieError::InvalidMessage(_)) => {
                ApiError::BadRequest(err.to_string())
            }
            _ => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_maps_to_bad_request() {
        let err: ApiError = anyhow::Error::from(MargieError::EmptyInput).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_provider_failures_map_to_bad_gateway() {
        for source in [
            MargieError::Provider("boom".to_string()),
            MargieError::Authentication("bad key".to_string()),
            MargieError::RateLimited { retry_after: None },
        ] {
            let err: ApiError = anyhow::Error::from(source).into();
            assert!(matches!(err, ApiError::BadGateway(_)));
        }
    }

    #[test]
    fn test_into_response_status() {
        assert_eq!(
            ApiError::busy().into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::no_session().into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::internal("oops").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
