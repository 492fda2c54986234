//! Unauthenticated endpoints backing the customer-facing website.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::services::{
    CreateEnquiryRequest, CreateServiceRequest, ServiceRequestView, SubmitFeedbackRequest,
};
use crate::domain::entities::{Enquiry, Feedback};
use crate::infrastructure::http::middleware::{ApiResult, AppState};

pub async fn create_service_request(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceRequest>,
) -> ApiResult<(StatusCode, Json<ServiceRequestView>)> {
    let view = state.service_request_service.create_public(request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn track_service_request(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<Vec<ServiceRequestView>>> {
    let tickets = state.service_request_service.track(&identifier).await?;
    Ok(Json(tickets))
}

pub async fn create_enquiry(
    State(state): State<AppState>,
    Json(request): Json<CreateEnquiryRequest>,
) -> ApiResult<(StatusCode, Json<Enquiry>)> {
    let enquiry = state.enquiry_service.create_public(request).await?;
    Ok((StatusCode::CREATED, Json(enquiry)))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    let feedback = state.feedback_service.submit(request).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}
