//! API request and response DTOs
//!
//! Data Transfer Objects for the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Responses
// =============================================================================

/// User response
///
/// `email` is only present on the caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub banner_picture_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Tweet response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetResponse {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_username: String,
    pub media_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub retweet_count: i64,
    pub is_retweet: bool,
    pub original_tweet_id: Option<String>,
    pub original_author_username: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Notification response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    pub sender_username: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub tweet_id: Option<String>,
    pub tweet_content: Option<String>,
    pub comment_id: Option<String>,
    pub comment_content: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Bookmark response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkResponse {
    pub id: String,
    pub tweet_id: String,
    pub created_at: DateTime<Utc>,
}

/// Trending hashtag response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagResponse {
    pub name: String,
    pub usage_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Reaction summary response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSummaryResponse {
    pub tweet_id: String,
    pub reaction_count: i64,
    pub reactions: BTreeMap<String, i64>,
}

/// Token response (OAuth2 password-flow shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// =============================================================================
// Requests
// =============================================================================

/// Pagination parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    /// Return items strictly older than this ID
    pub max_id: Option<String>,
    pub limit: Option<usize>,
}

/// Notification listing parameters
#[derive(Debug, Default, Deserialize)]
pub struct NotificationParams {
    pub max_id: Option<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub unread_only: bool,
}

/// Login form (`application/x-www-form-urlencoded`)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub banner_picture_url: Option<String>,
}

/// Create tweet request
#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub content: String,
    pub media_url: Option<String>,
}

/// Create comment request
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub tweet_id: String,
    pub content: String,
}

/// Base64 image payload for emotion detection and reactions
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    /// Base64 image, optionally as a `data:` URL
    pub image: String,
}

/// Trending hashtag parameters
#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<usize>,
}
