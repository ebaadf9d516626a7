use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
    Router,
};
use giftdesk_core::{MediaError, ObjectStore};

use crate::error::AppError;
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/media/{*key}", get(media_handler))
}

/// Serves a stored image by key. Public.
pub async fn media_handler(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lookup_key = key.clone();
    let body = tokio::task::spawn_blocking(move || state.store.get(&lookup_key))
        .await?
        .map_err(|err| match err {
            MediaError::ForeignObject(_) | MediaError::NotFound(_) => {
                AppError::NotFound(format!("media not found: {key}"))
            }
            other => other.into(),
        })?;

    Ok((
        [
            (CONTENT_TYPE, body.content_type),
            (CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        body.bytes,
    ))
}
