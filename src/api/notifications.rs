//! Notification endpoints

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::AppState;
use crate::api::{NotificationParams, NotificationResponse, notification_to_response};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::EngagementService;

fn engagement(state: &AppState) -> EngagementService {
    EngagementService::new(state.db.clone(), state.emotion_classifier.clone())
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<NotificationParams>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let notifications = engagement(&state)
        .list_notifications(&user, limit, params.max_id.as_deref(), params.unread_only)
        .await?;

    Ok(Json(
        notifications.iter().map(notification_to_response).collect(),
    ))
}

/// GET /notifications/count
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = engagement(&state).unread_count(&user).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

/// PUT /notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    engagement(&state).mark_read(&user, &id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// PUT /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = engagement(&state).mark_all_read(&user).await?;
    Ok(Json(serde_json::json!({ "success": true, "updated": updated })))
}
