//! Emotion detection and reaction endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use crate::api::{ImageRequest, ReactionSummaryResponse, reaction_summary_to_response};
use crate::auth::CurrentUser;
use crate::data::EmotionReaction;
use crate::error::AppError;
use crate::service::EngagementService;

fn engagement(state: &AppState) -> EngagementService {
    EngagementService::new(state.db.clone(), state.emotion_classifier.clone())
}

/// POST /api/emotion
///
/// Analyze an image. No faces is a success with an empty list.
pub async fn detect(
    State(state): State<AppState>,
    Json(req): Json<ImageRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let faces = engagement(&state).detect_emotion(&req.image).await?;

    let message = if faces.is_empty() {
        "No face detected"
    } else {
        "Analysis complete"
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
        "emotions": faces,
    })))
}

/// POST /api/tweets/:id/reactions
pub async fn react(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ImageRequest>,
) -> Result<Json<EmotionReaction>, AppError> {
    let reaction = engagement(&state).react(&user, &id, &req.image).await?;
    Ok(Json(reaction))
}

/// GET /api/tweets/:id/reactions
pub async fn list_reactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EmotionReaction>>, AppError> {
    let reactions = engagement(&state).list_reactions(&id).await?;
    Ok(Json(reactions))
}

/// GET /api/tweets/:id/reactions/summary
pub async fn reaction_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReactionSummaryResponse>, AppError> {
    let summary = engagement(&state).reaction_summary(&id).await?;
    Ok(Json(reaction_summary_to_response(summary)))
}

/// DELETE /api/tweets/:id/reactions
pub async fn delete_reaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    engagement(&state).delete_reaction(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
