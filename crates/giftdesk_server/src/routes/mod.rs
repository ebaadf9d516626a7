use axum::{
    extract::DefaultBodyLimit,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::get,
    Json, Router,
};
use giftdesk_core::{bearer_token, core_version, ping, DocumentId, RecordStatus};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::SharedState;

pub mod categories;
pub mod committees;
pub mod media;
pub mod offers;
pub mod orders;
pub mod products;
pub mod users;

/// Headroom for multipart framing and text fields on top of the image bytes.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;
const MAX_IMAGES_PER_FORM: usize = 4;

pub fn router(state: SharedState) -> Router {
    let body_limit = state
        .max_upload_bytes
        .saturating_mul(MAX_IMAGES_PER_FORM)
        .saturating_add(FORM_OVERHEAD_BYTES);

    let api = Router::new()
        .route("/health", get(health_handler))
        .merge(categories::routes())
        .merge(products::routes())
        .merge(offers::routes())
        .merge(committees::routes())
        .merge(users::routes())
        .merge(orders::routes());

    Router::new()
        .nest("/api", api)
        .merge(media::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": ping(), "version": core_version() }))
}

/// JSON envelope for collection listings.
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
}

pub(crate) fn parse_id(raw: &str) -> Result<DocumentId, AppError> {
    DocumentId::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("invalid document id: {raw}")))
}

pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<RecordStatus>, AppError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            RecordStatus::parse(value).ok_or_else(|| {
                AppError::BadRequest(format!("status must be active or inactive, got {value}"))
            })
        })
        .transpose()
}
