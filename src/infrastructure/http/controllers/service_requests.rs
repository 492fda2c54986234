use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::application::services::{
    CreateServiceRequest, EngineerSlaStats, ServiceRequestPage, ServiceRequestQuery,
    ServiceRequestView, StatusUpdateRequest,
};
use crate::domain::entities::TicketStatus;
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub engineer_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyTicketsQuery {
    pub engineer_id: Option<i64>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn create_service_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateServiceRequest>,
) -> ApiResult<(StatusCode, Json<ServiceRequestView>)> {
    let view = state
        .service_request_service
        .create(&auth_user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_service_requests(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<ServiceRequestQuery>,
) -> ApiResult<Json<ServiceRequestPage>> {
    let page = state.service_request_service.list(&auth_user, query).await?;
    Ok(Json(page))
}

pub async fn my_service_requests(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<MyTicketsQuery>,
) -> ApiResult<Json<Vec<ServiceRequestView>>> {
    let tickets = state
        .service_request_service
        .my_tickets(&auth_user, query.engineer_id, query.status)
        .await?;
    Ok(Json(tickets))
}

pub async fn get_service_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ServiceRequestView>> {
    let view = state.service_request_service.get(&auth_user, id).await?;
    Ok(Json(view))
}

pub async fn assign_service_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<ServiceRequestView>> {
    let view = state
        .service_request_service
        .assign(&auth_user, id, request.engineer_id)
        .await?;
    Ok(Json(view))
}

pub async fn update_service_request_status(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<ServiceRequestView>> {
    let view = state
        .service_request_service
        .update_status(&auth_user, id, request)
        .await?;
    Ok(Json(view))
}

pub async fn engineer_sla_stats(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(engineer_id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<EngineerSlaStats>> {
    let stats = state
        .service_request_service
        .engineer_stats(&auth_user, engineer_id, query.from, query.to)
        .await?;
    Ok(Json(stats))
}
