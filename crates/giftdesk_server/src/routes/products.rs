use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use giftdesk_core::model::product::{Product, ProductInput};
use giftdesk_core::repo::product_repo::{ProductListQuery, SqliteProductRepository};
use giftdesk_core::{FsObjectStore, Permission, ProductService};
use log::info;
use rusqlite::Connection;
use serde::Deserialize;

use super::{parse_id, parse_status, session_token, Listing};
use crate::error::AppError;
use crate::form::FormData;
use crate::state::{require_session, with_store, AppState, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/products", get(list_handler).post(create_handler))
        .route(
            "/products/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    status: Option<String>,
}

fn service<'a>(
    conn: &'a Connection,
    app: &'a AppState,
) -> ProductService<SqliteProductRepository<'a>, &'a FsObjectStore> {
    ProductService::new(SqliteProductRepository::new(conn), &app.store)
        .with_max_upload_bytes(app.max_upload_bytes)
}

fn product_input(form: &FormData) -> Result<ProductInput, AppError> {
    Ok(ProductInput {
        name: form.text_or_default("name"),
        amount: form.required("amount")?,
        discount: form.parse("discount")?.unwrap_or(0),
        available_offers: form.list("availableOffers")?,
        highlights: form.list("highlights")?,
        status: parse_status(form.text("status"))?.unwrap_or_default(),
    })
}

pub async fn list_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Listing<Product>>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let query = ProductListQuery {
        status: parse_status(filter.status.as_deref())?,
    };
    let products = with_store(&state, move |conn, app| {
        Ok(service(conn, app).list_products(&query)?)
    })
    .await?;
    Ok(Json(products.into()))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let id = parse_id(&id)?;
    let product = with_store(&state, move |conn, app| Ok(service(conn, app).get_product(id)?)).await?;
    Ok(Json(product))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let form = FormData::read(multipart?).await?;
    let input = product_input(&form)?;
    let product = with_store(&state, move |conn, app| {
        Ok(service(conn, app).create_product(&input, &form.images)?)
    })
    .await?;

    info!(
        "event=product_created module=server status=ok id={} images={}",
        product.id,
        product.images.len()
    );
    Ok((StatusCode::CREATED, Json(product)))
}

/// Omitting `existingImages` keeps every current image.
pub async fn update_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let form = FormData::read(multipart?).await?;
    let input = product_input(&form)?;
    let keep = form.optional_list("existingImages")?;
    let product = with_store(&state, move |conn, app| {
        Ok(service(conn, app).update_product(id, &input, keep.as_deref(), &form.images)?)
    })
    .await?;
    Ok(Json(product))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let product = with_store(&state, move |conn, app| Ok(service(conn, app).delete_product(id)?)).await?;
    Ok(Json(product))
}
