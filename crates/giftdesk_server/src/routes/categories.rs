use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use giftdesk_core::model::category::{Category, CategoryInput};
use giftdesk_core::repo::category_repo::{CategoryListQuery, SqliteCategoryRepository};
use giftdesk_core::{CategoryService, FsObjectStore, Permission};
use log::info;
use rusqlite::Connection;
use serde::Deserialize;

use super::{parse_id, parse_status, session_token, Listing};
use crate::error::AppError;
use crate::form::FormData;
use crate::state::{require_session, with_store, AppState, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/categories", get(list_handler).post(create_handler))
        .route(
            "/categories/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilter {
    status: Option<String>,
}

fn service<'a>(
    conn: &'a Connection,
    app: &'a AppState,
) -> CategoryService<SqliteCategoryRepository<'a>, &'a FsObjectStore> {
    CategoryService::new(SqliteCategoryRepository::new(conn), &app.store)
        .with_max_upload_bytes(app.max_upload_bytes)
}

fn category_input(form: &FormData) -> Result<CategoryInput, AppError> {
    Ok(CategoryInput {
        name: form.text_or_default("name"),
        status: parse_status(form.text("status"))?.unwrap_or_default(),
    })
}

pub async fn list_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Listing<Category>>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let query = CategoryListQuery {
        status: parse_status(filter.status.as_deref())?,
    };
    let categories = with_store(&state, move |conn, app| {
        Ok(service(conn, app).list_categories(&query)?)
    })
    .await?;
    Ok(Json(categories.into()))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let id = parse_id(&id)?;
    let category = with_store(&state, move |conn, app| Ok(service(conn, app).get_category(id)?)).await?;
    Ok(Json(category))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let form = FormData::read(multipart?).await?;
    let input = category_input(&form)?;
    let category = with_store(&state, move |conn, app| {
        Ok(service(conn, app).create_category(&input, &form.images)?)
    })
    .await?;

    info!("event=category_created module=server status=ok id={}", category.id);
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Category>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let form = FormData::read(multipart?).await?;
    let input = category_input(&form)?;
    let category = with_store(&state, move |conn, app| {
        Ok(service(conn, app).update_category(id, &input, &form.images)?)
    })
    .await?;
    Ok(Json(category))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let category = with_store(&state, move |conn, app| Ok(service(conn, app).delete_category(id)?)).await?;
    Ok(Json(category))
}
