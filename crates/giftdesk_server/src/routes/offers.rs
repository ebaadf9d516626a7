use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use giftdesk_core::model::offer::{DiscountType, Offer, OfferInput};
use giftdesk_core::repo::category_repo::SqliteCategoryRepository;
use giftdesk_core::repo::offer_repo::{OfferListQuery, SqliteOfferRepository};
use giftdesk_core::{FsObjectStore, OfferService, Permission};
use log::info;
use rusqlite::Connection;
use serde::Deserialize;

use super::{parse_id, parse_status, session_token, Listing};
use crate::error::AppError;
use crate::form::FormData;
use crate::state::{require_session, with_store, AppState, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/offers", get(list_handler).post(create_handler))
        .route("/offers/create", post(create_handler))
        .route(
            "/offers/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferFilter {
    category_id: Option<String>,
    status: Option<String>,
}

type SqliteOfferService<'a> =
    OfferService<SqliteOfferRepository<'a>, SqliteCategoryRepository<'a>, &'a FsObjectStore>;

fn service<'a>(conn: &'a Connection, app: &'a AppState) -> SqliteOfferService<'a> {
    OfferService::new(
        SqliteOfferRepository::new(conn),
        SqliteCategoryRepository::new(conn),
        &app.store,
    )
    .with_max_upload_bytes(app.max_upload_bytes)
}

fn offer_input(form: &FormData) -> Result<OfferInput, AppError> {
    let category_id = form
        .text_any(&["categoryId", "category_id"])
        .ok_or_else(|| AppError::BadRequest("categoryId is required".to_string()))
        .and_then(parse_id)?;
    let raw_type = form
        .text_any(&["discountType", "discount_type"])
        .ok_or_else(|| AppError::BadRequest("discountType is required".to_string()))?;
    let discount_type = DiscountType::parse(raw_type).ok_or_else(|| {
        AppError::BadRequest(format!(
            "discountType must be percentage or flat, got {raw_type}"
        ))
    })?;
    let label = form
        .text_any(&[discount_type.label_field(), "label"])
        .unwrap_or_default()
        .to_string();

    Ok(OfferInput {
        category_id,
        discount_type,
        label,
        value: form.required("value")?,
        status: parse_status(form.text("status"))?.unwrap_or_default(),
    })
}

pub async fn list_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(filter): Query<OfferFilter>,
) -> Result<Json<Listing<Offer>>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let query = OfferListQuery {
        category_id: filter
            .category_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_id)
            .transpose()?,
        status: parse_status(filter.status.as_deref())?,
    };
    let offers = with_store(&state, move |conn, app| {
        Ok(service(conn, app).list_offers(&query)?)
    })
    .await?;
    Ok(Json(offers.into()))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Offer>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let id = parse_id(&id)?;
    let offer = with_store(&state, move |conn, app| {
        Ok(service(conn, app).get_offer(id)?)
    })
    .await?;
    Ok(Json(offer))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Offer>), AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let form = FormData::read(multipart?).await?;
    let input = offer_input(&form)?;
    let offer = with_store(&state, move |conn, app| {
        Ok(service(conn, app).create_offer(&input, &form.images)?)
    })
    .await?;

    info!(
        "event=offer_created module=server status=ok id={} category_id={}",
        offer.id, offer.category_id
    );
    Ok((StatusCode::CREATED, Json(offer)))
}

/// Omitting `existingImages` keeps every current image.
pub async fn update_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Offer>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let form = FormData::read(multipart?).await?;
    let input = offer_input(&form)?;
    let keep = form.optional_list("existingImages")?;
    let offer = with_store(&state, move |conn, app| {
        Ok(service(conn, app).update_offer(id, &input, keep.as_deref(), &form.images)?)
    })
    .await?;
    Ok(Json(offer))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Offer>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let offer = with_store(&state, move |conn, app| Ok(service(conn, app).delete_offer(id)?)).await?;
    Ok(Json(offer))
}
