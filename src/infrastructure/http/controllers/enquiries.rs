use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::services::{CreateEnquiryRequest, EnquiryQuery, UpdateEnquiryRequest};
use crate::domain::entities::Enquiry;
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

pub async fn create_enquiry(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateEnquiryRequest>,
) -> ApiResult<(StatusCode, Json<Enquiry>)> {
    let enquiry = state.enquiry_service.create(&auth_user, request).await?;
    Ok((StatusCode::CREATED, Json(enquiry)))
}

pub async fn list_enquiries(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<EnquiryQuery>,
) -> ApiResult<Json<Vec<Enquiry>>> {
    let enquiries = state.enquiry_service.list(&auth_user, query).await?;
    Ok(Json(enquiries))
}

pub async fn get_enquiry(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Enquiry>> {
    let enquiry = state.enquiry_service.get(&auth_user, id).await?;
    Ok(Json(enquiry))
}

pub async fn update_enquiry(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEnquiryRequest>,
) -> ApiResult<Json<Enquiry>> {
    let enquiry = state.enquiry_service.update(&auth_user, id, request).await?;
    Ok(Json(enquiry))
}

pub async fn delete_enquiry(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.enquiry_service.delete(&auth_user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
