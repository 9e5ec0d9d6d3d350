//! Data models
//!
//! Rust structs representing stored documents.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// `followers_count` and `following_count` are denormalized from `follows`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string, never exposed over the API
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub banner_picture_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub banner_picture_url: Option<String>,
}

// =============================================================================
// Tweet
// =============================================================================

/// A tweet or a retweet
///
/// A retweet is a copy of the original's content with `is_retweet` set and
/// a link back through `original_tweet_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tweet {
    pub id: String,
    pub content: String,
    pub author_id: String,
    /// Cached at write time, not updated on rename
    pub author_username: String,
    pub media_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub retweet_count: i64,
    pub is_retweet: bool,
    pub original_tweet_id: Option<String>,
    pub original_author_username: Option<String>,
    /// Lowercased hashtag names without the leading '#'
    pub tags: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    /// Build a fresh tweet with zero counters
    pub fn new(author: &User, content: String, media_url: Option<String>, tags: Vec<String>) -> Self {
        Self {
            id: EntityId::new().0,
            content,
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            media_url,
            like_count: 0,
            comment_count: 0,
            retweet_count: 0,
            is_retweet: false,
            original_tweet_id: None,
            original_author_username: None,
            tags: Json(tags),
            created_at: Utc::now(),
        }
    }

    /// Build a retweet of `original` authored by `author`
    pub fn retweet_of(original: &Tweet, author: &User) -> Self {
        Self {
            id: EntityId::new().0,
            content: original.content.clone(),
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            media_url: original.media_url.clone(),
            like_count: 0,
            comment_count: 0,
            retweet_count: 0,
            is_retweet: true,
            original_tweet_id: Some(original.id.clone()),
            original_author_username: Some(original.author_username.clone()),
            tags: original.tags.clone(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Social graph
// =============================================================================

/// Follow edge: `follower_id` follows `followed_id`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub follower_username: String,
    pub followed_id: String,
    pub followed_username: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Engagement
// =============================================================================

/// Like edge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: String,
    pub tweet_id: String,
    pub user_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Comment on a tweet
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub tweet_id: String,
    pub author_id: String,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

/// Bookmark edge
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub tweet_id: String,
    pub created_at: DateTime<Utc>,
}

/// Emotion reaction derived from a classifier, one per (user, tweet)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmotionReaction {
    pub id: String,
    pub tweet_id: String,
    pub user_id: String,
    pub emotion: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Notification delivered to `recipient_id`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    pub sender_username: String,
    /// Type: follow, like, comment, retweet, mention
    pub notification_type: String,
    pub tweet_id: Option<String>,
    /// Short preview of the tweet
    pub tweet_content: Option<String>,
    pub comment_id: Option<String>,
    /// Short preview of the comment
    pub comment_content: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Follow,
    Like,
    Comment,
    Retweet,
    Mention,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Retweet => "retweet",
            Self::Mention => "mention",
        }
    }
}

/// Hashtag usage statistics
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HashtagStat {
    pub name: String,
    pub usage_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
}
