use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::application::services::EngineerAnalytics;
use crate::domain::entities::{EngineerFeedback, Feedback};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub engineer_id: Option<i64>,
}

pub async fn my_feedback(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<EngineerFeedback>>> {
    let feedback = state.feedback_service.my_feedback(&auth_user).await?;
    Ok(Json(feedback))
}

pub async fn engineer_analytics(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<EngineerAnalytics>> {
    let analytics = state
        .feedback_service
        .engineer_analytics(&auth_user, query.engineer_id)
        .await?;
    Ok(Json(analytics))
}

pub async fn all_engineer_analytics(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<EngineerAnalytics>>> {
    let analytics = state.feedback_service.all_engineer_analytics(&auth_user).await?;
    Ok(Json(analytics))
}

pub async fn negative_feedback(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Feedback>>> {
    let feedback = state.feedback_service.negative(&auth_user).await?;
    Ok(Json(feedback))
}
