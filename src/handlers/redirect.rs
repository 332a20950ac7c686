use crate::{error::ServiceError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /s/:token
///
/// Resolve the token through the store and answer with a 302 to the original
/// URL. The rate limiter runs first (429 beats 404), and the usage event is
/// emitted off the response path so the redirect never waits on analytics.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Response, ServiceError> {
    let url = state.service.resolve(&token).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
