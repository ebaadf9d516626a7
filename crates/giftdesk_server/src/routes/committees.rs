use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use giftdesk_core::model::committee::{Committee, CommitteeInput};
use giftdesk_core::repo::committee_repo::SqliteCommitteeRepository;
use giftdesk_core::{CommitteeService, FsObjectStore, Permission};
use rusqlite::Connection;

use super::{parse_id, session_token, Listing};
use crate::error::AppError;
use crate::form::FormData;
use crate::state::{require_session, with_store, AppState, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/committees", get(list_handler).post(create_handler))
        .route(
            "/committees/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

fn service<'a>(
    conn: &'a Connection,
    app: &'a AppState,
) -> CommitteeService<SqliteCommitteeRepository<'a>, &'a FsObjectStore> {
    CommitteeService::new(SqliteCommitteeRepository::new(conn), &app.store)
        .with_max_upload_bytes(app.max_upload_bytes)
}

fn committee_input(form: &FormData) -> Result<CommitteeInput, AppError> {
    Ok(CommitteeInput {
        name: form.text_or_default("name"),
        description: form.text_or_default("description"),
        order: form.parse("order")?.unwrap_or(0),
        activity: form.text_or_default("activity"),
    })
}

pub async fn list_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Listing<Committee>>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let committees = with_store(&state, |conn, app| Ok(service(conn, app).list_committees()?)).await?;
    Ok(Json(committees.into()))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Committee>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let id = parse_id(&id)?;
    let committee = with_store(&state, move |conn, app| Ok(service(conn, app).get_committee(id)?)).await?;
    Ok(Json(committee))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Committee>), AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let form = FormData::read(multipart?).await?;
    let input = committee_input(&form)?;
    let committee = with_store(&state, move |conn, app| {
        Ok(service(conn, app).create_committee(&input, &form.images)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(committee)))
}

pub async fn update_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Committee>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let form = FormData::read(multipart?).await?;
    let input = committee_input(&form)?;
    let committee = with_store(&state, move |conn, app| {
        Ok(service(conn, app).update_committee(id, &input, &form.images)?)
    })
    .await?;
    Ok(Json(committee))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Committee>, AppError> {
    require_session(&state, session_token(&headers), Permission::WriteCatalog).await?;
    let id = parse_id(&id)?;
    let committee = with_store(&state, move |conn, app| Ok(service(conn, app).delete_committee(id)?)).await?;
    Ok(Json(committee))
}
