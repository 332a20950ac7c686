use crate::{error::ServiceError, AppState};
use axum::{
    extract::{Host, State},
    response::{IntoResponse, Response},
};
use std::fmt::Write;
use std::sync::Arc;

/// GET /l
///
/// Operator view of every stored mapping, one `short -> original` line per
/// token, in store order. Read-only.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
) -> Result<Response, ServiceError> {
    let entries = state.service.list_all().await?;

    let mut body = String::new();
    for (token, url) in entries {
        let short = state.config.short_url(&host, &token);
        // Writing to a String cannot fail.
        let _ = writeln!(body, "{short} -> {url}");
    }

    Ok(body.into_response())
}
