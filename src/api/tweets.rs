//! Tweet, like, comment, retweet and bookmark endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use crate::api::{
    BookmarkResponse, CreateCommentRequest, CreateTweetRequest, PaginationParams, TweetResponse,
    bookmark_to_response, tweet_to_response, tweets_to_response,
};
use crate::auth::CurrentUser;
use crate::data::{Comment, Like};
use crate::error::AppError;
use crate::service::ContentService;

/// POST /tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateTweetRequest>,
) -> Result<Json<TweetResponse>, AppError> {
    let tweet = ContentService::new(state.db.clone())
        .create_tweet(&user, &req.content, req.media_url)
        .await?;
    Ok(Json(tweet_to_response(&tweet)))
}

/// GET /tweets
///
/// Newest first. `max_id` pages to older tweets.
pub async fn list_tweets(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<TweetResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let tweets = ContentService::new(state.db.clone())
        .list_tweets(limit, params.max_id.as_deref())
        .await?;
    Ok(Json(tweets_to_response(&tweets)))
}

/// GET /tweets/:id
pub async fn get_tweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TweetResponse>, AppError> {
    let tweet = ContentService::new(state.db.clone()).get_tweet(&id).await?;
    Ok(Json(tweet_to_response(&tweet)))
}

/// DELETE /tweets/:id
pub async fn delete_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ContentService::new(state.db.clone())
        .delete_tweet(&user, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Likes
// =============================================================================

/// POST /tweets/:id/like
pub async fn like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Like>, AppError> {
    let like = ContentService::new(state.db.clone()).like(&user, &id).await?;
    Ok(Json(like))
}

/// DELETE /tweets/:id/like (also /unlike)
pub async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ContentService::new(state.db.clone()).unlike(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tweets/:id/like_status
pub async fn like_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let liked = ContentService::new(state.db.clone())
        .like_status(&user, &id)
        .await?;
    Ok(Json(serde_json::json!({ "liked": liked })))
}

/// GET /tweets/:id/likes
pub async fn list_likes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, AppError> {
    let likes = ContentService::new(state.db.clone()).list_likes(&id).await?;
    Ok(Json(likes))
}

// =============================================================================
// Comments
// =============================================================================

/// POST /comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    let comment = ContentService::new(state.db.clone())
        .comment(&user, &req.tweet_id, &req.content)
        .await?;
    Ok(Json(comment))
}

/// GET /tweets/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = ContentService::new(state.db.clone())
        .list_comments(&id)
        .await?;
    Ok(Json(comments))
}

// =============================================================================
// Retweets
// =============================================================================

/// POST /tweets/:id/retweet
pub async fn retweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TweetResponse>, AppError> {
    let retweet = ContentService::new(state.db.clone())
        .retweet(&user, &id)
        .await?;
    Ok(Json(tweet_to_response(&retweet)))
}

/// DELETE /tweets/:id/retweet (also /unretweet)
pub async fn unretweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ContentService::new(state.db.clone())
        .unretweet(&user, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tweets/:id/retweet_status
pub async fn retweet_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let retweeted = ContentService::new(state.db.clone())
        .retweet_status(&user, &id)
        .await?;
    Ok(Json(serde_json::json!({ "retweeted": retweeted })))
}

// =============================================================================
// Bookmarks
// =============================================================================

/// POST /tweets/:id/bookmark
pub async fn bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<BookmarkResponse>, AppError> {
    let bookmark = ContentService::new(state.db.clone())
        .bookmark(&user, &id)
        .await?;
    Ok(Json(bookmark_to_response(&bookmark)))
}

/// DELETE /tweets/:id/bookmark
pub async fn unbookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ContentService::new(state.db.clone())
        .unbookmark(&user, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /bookmarks
pub async fn list_bookmarks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<TweetResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let tweets = ContentService::new(state.db.clone())
        .list_bookmarks(&user, limit)
        .await?;
    Ok(Json(tweets_to_response(&tweets)))
}
