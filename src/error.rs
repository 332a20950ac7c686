use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure taxonomy for the shortener core.
///
/// `Validation`, `Collision`, `NotFound` and `RateLimited` are resolved
/// locally and returned to the caller as-is. Everything a collaborator can
/// throw (store, hashing, limiter) funnels into `Internal` and is surfaced
/// as a generic 500 with the detail kept server-side.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("token '{token}' already maps to a different URL")]
    Collision { token: String },

    #[error("no mapping for token")]
    NotFound,

    #[error("lookups for this token are throttled")]
    RateLimited,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, (*msg).to_owned()),
            ServiceError::Collision { .. } => (StatusCode::CONFLICT, self.to_string()),
            ServiceError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ServiceError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServiceError::Internal(e) => {
                tracing::error!("internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
            }
        };
        (status, body).into_response()
    }
}
