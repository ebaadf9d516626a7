use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use giftdesk_core::model::user::{Role, User, UserInput};
use giftdesk_core::repo::user_repo::{SqliteUserRepository, UserListQuery};
use giftdesk_core::{Permission, UserService};
use log::info;
use rusqlite::Connection;
use serde::Deserialize;

use super::{parse_id, session_token, Listing};
use crate::error::AppError;
use crate::state::{require_session, with_store, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/users", get(list_handler).post(create_handler))
        .route(
            "/users/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    role: Option<String>,
}

fn service(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::new(SqliteUserRepository::new(conn))
}

fn json_body(payload: Result<Json<UserInput>, JsonRejection>) -> Result<UserInput, AppError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

pub async fn list_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Listing<User>>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let role = filter
        .role
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            Role::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("role must be admin, editor or viewer, got {raw}"))
            })
        })
        .transpose()?;
    let users = with_store(&state, move |conn, _| {
        Ok(service(conn).list_users(&UserListQuery { role })?)
    })
    .await?;
    Ok(Json(users.into()))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let id = parse_id(&id)?;
    let user = with_store(&state, move |conn, _| Ok(service(conn).get_user(id)?)).await?;
    Ok(Json(user))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    require_session(&state, session_token(&headers), Permission::ManageUsers).await?;
    let input = json_body(payload)?;
    let user = with_store(&state, move |conn, _| Ok(service(conn).create_user(&input)?)).await?;

    info!(
        "event=user_created module=server status=ok id={} role={}",
        user.id,
        user.role.as_str()
    );
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    require_session(&state, session_token(&headers), Permission::ManageUsers).await?;
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    let user = with_store(&state, move |conn, _| Ok(service(conn).update_user(id, &input)?)).await?;
    Ok(Json(user))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    require_session(&state, session_token(&headers), Permission::ManageUsers).await?;
    let id = parse_id(&id)?;
    let user = with_store(&state, move |conn, _| Ok(service(conn).delete_user(id)?)).await?;
    Ok(Json(user))
}
