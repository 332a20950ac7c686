use crate::{error::ServiceError, AppState};
use axum::{
    extract::{Host, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ShortenParams {
    url: Option<String>,
}

/// GET /p?url=<url>
///
/// Derive a token for the given URL and persist the mapping. Responds 201
/// with the short form and the original URL; 400 when `url` is missing or
/// empty; 409 when the token is already bound to a different URL.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Query(params): Query<ShortenParams>,
) -> Result<Response, ServiceError> {
    let url = params.url.unwrap_or_default();
    let token = state.service.create_mapping(&url).await?;
    let short = state.config.short_url(&host, &token);

    Ok((StatusCode::CREATED, format!("{short} -> {url}\n")).into_response())
}
