use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use giftdesk_core::model::order::{Order, OrderStatus};
use giftdesk_core::Permission;
use serde::Deserialize;

use super::{session_token, Listing};
use crate::error::AppError;
use crate::state::{require_session, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/orders", get(list_handler))
        .route("/orders/{id}", get(get_handler))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    status: Option<String>,
}

pub async fn list_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Listing<Order>>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let status = filter
        .status
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            OrderStatus::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "status must be pending, shipped, delivered or cancelled, got {raw}"
                ))
            })
        })
        .transpose()?;
    Ok(Json(state.orders.list_orders(status).into()))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    require_session(&state, session_token(&headers), Permission::Read).await?;
    let order = state
        .orders
        .get_order(&id)
        .ok_or_else(|| AppError::NotFound(format!("order not found: {id}")))?;
    Ok(Json(order))
}
