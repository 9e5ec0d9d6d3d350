//! Account, profile and follow endpoints

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use crate::api::{
    LoginForm, PaginationParams, RegisterRequest, TokenResponse, TweetResponse,
    UpdateProfileRequest, UserResponse, tweets_to_response, user_to_response,
};
use crate::auth::CurrentUser;
use crate::data::{Follow, ProfilePatch};
use crate::error::AppError;
use crate::service::{ContentService, GraphService, IdentityService};

fn identity(state: &AppState) -> IdentityService {
    IdentityService::new(state.db.clone(), state.config.auth.clone())
}

/// POST /token
///
/// OAuth2 password-flow style login from a form body.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = identity(&state);
    let user = service
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or(AppError::Unauthorized("Incorrect username or password"))?;

    let access_token = service.issue_token(&user)?;
    tracing::info!(username = %user.username, "Token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /users
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = identity(&state)
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(Json(user_to_response(&user, true)))
}

/// GET /users/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user_to_response(&user, true))
}

/// PATCH /users/me
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let patch = ProfilePatch {
        bio: req.bio,
        profile_picture_url: req.profile_picture_url,
        banner_picture_url: req.banner_picture_url,
    };
    let updated = identity(&state).update_profile(&user, patch).await?;

    Ok(Json(user_to_response(&updated, true)))
}

/// GET /users/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = identity(&state).get_user(&username).await?;
    Ok(Json(user_to_response(&user, false)))
}

/// GET /users/:username/tweets
pub async fn user_tweets(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<TweetResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let tweets = ContentService::new(state.db.clone())
        .list_user_tweets(&username, limit, params.max_id.as_deref())
        .await?;

    Ok(Json(tweets_to_response(&tweets)))
}

/// GET /users/:username/liked-tweets
pub async fn liked_tweets(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<TweetResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let tweets = ContentService::new(state.db.clone())
        .list_liked_tweets(&username, limit)
        .await?;

    Ok(Json(tweets_to_response(&tweets)))
}

/// GET /users/:username/retweeted-tweets
pub async fn retweeted_tweets(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<TweetResponse>>, AppError> {
    let limit = state.config.timeline.clamp_limit(params.limit);
    let tweets = ContentService::new(state.db.clone())
        .list_retweeted_tweets(&username, limit, params.max_id.as_deref())
        .await?;

    Ok(Json(tweets_to_response(&tweets)))
}

/// POST /users/:username/follow
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<Follow>, AppError> {
    let follow = GraphService::new(state.db.clone())
        .follow(&user, &username)
        .await?;
    Ok(Json(follow))
}

/// DELETE /users/:username/follow (also /unfollow)
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    GraphService::new(state.db.clone())
        .unfollow(&user, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:username/follow_status
pub async fn follow_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let following = GraphService::new(state.db.clone())
        .follow_status(&user, &username)
        .await?;
    Ok(Json(serde_json::json!({ "following": following })))
}

/// GET /users/:username/followers
pub async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = GraphService::new(state.db.clone())
        .followers(&username)
        .await?;
    Ok(Json(
        users.iter().map(|u| user_to_response(u, false)).collect(),
    ))
}

/// GET /users/:username/following
pub async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = GraphService::new(state.db.clone())
        .following(&username)
        .await?;
    Ok(Json(
        users.iter().map(|u| user_to_response(u, false)).collect(),
    ))
}

/// GET /users/:username/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stats = GraphService::new(state.db.clone()).stats(&username).await?;
    Ok(Json(serde_json::json!({
        "followers_count": stats.followers_count,
        "following_count": stats.following_count,
    })))
}
