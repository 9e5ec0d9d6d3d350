//! Hashtag endpoints

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::AppState;
use crate::api::{
    HashtagResponse, PaginationParams, TrendingParams, TweetResponse, hashtag_to_response,
    tweets_to_response,
};
use crate::error::AppError;
use crate::service::{ContentService, EngagementService};

const DEFAULT_TRENDING_LIMIT: usize = 10;

/// GET /hashtags/trending
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<HashtagResponse>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_TRENDING_LIMIT)
        .clamp(1, state.config.timeline.max_limit);

    let hashtags = EngagementService::new(state.db.clone(), state.emotion_classifier.clone())
        .trending_hashtags(state.config.timeline.trending_window_hours, limit)
        .await?;

    Ok(Json(hashtags.iter().map(hashtag_to_response).collect()))
}

/// GET /hashtags/:tag/tweets
pub async fn tag_tweets(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<TweetResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let tweets = ContentService::new(state.db.clone())
        .list_tag_tweets(&tag, limit, params.max_id.as_deref())
        .await?;

    Ok(Json(tweets_to_response(&tweets)))
}
