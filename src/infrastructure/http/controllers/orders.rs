use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::services::{CreateOrderRequest, OrderQuery, RejectOrderRequest};
use crate::domain::entities::Order;
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

pub async fn create_order(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.order_service.create(&auth_user, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = state.order_service.list(&auth_user, query).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    let order = state.order_service.get(&auth_user, id).await?;
    Ok(Json(order))
}

pub async fn approve_order(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    let order = state.order_service.approve(&auth_user, id).await?;
    Ok(Json(order))
}

pub async fn reject_order(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<RejectOrderRequest>,
) -> ApiResult<Json<Order>> {
    let order = state
        .order_service
        .reject(&auth_user, id, request.reason)
        .await?;
    Ok(Json(order))
}
