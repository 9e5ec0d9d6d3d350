//! Conversion functions from database models to API DTOs

use crate::api::dto::*;
use crate::data::{Bookmark, HashtagStat, Notification, Tweet, User};
use crate::service::ReactionSummary;

/// Convert User to UserResponse
///
/// `include_email` is set only when the caller is looking at themselves.
pub fn user_to_response(user: &User, include_email: bool) -> UserResponse {
    UserResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        email: include_email.then(|| user.email.clone()),
        bio: user.bio.clone(),
        profile_picture_url: user.profile_picture_url.clone(),
        banner_picture_url: user.banner_picture_url.clone(),
        followers_count: user.followers_count,
        following_count: user.following_count,
        created_at: user.created_at,
    }
}

/// Convert Tweet to TweetResponse
pub fn tweet_to_response(tweet: &Tweet) -> TweetResponse {
    TweetResponse {
        id: tweet.id.clone(),
        content: tweet.content.clone(),
        author_id: tweet.author_id.clone(),
        author_username: tweet.author_username.clone(),
        media_url: tweet.media_url.clone(),
        like_count: tweet.like_count,
        comment_count: tweet.comment_count,
        retweet_count: tweet.retweet_count,
        is_retweet: tweet.is_retweet,
        original_tweet_id: tweet.original_tweet_id.clone(),
        original_author_username: tweet.original_author_username.clone(),
        tags: tweet.tags.0.clone(),
        created_at: tweet.created_at,
    }
}

pub fn tweets_to_response(tweets: &[Tweet]) -> Vec<TweetResponse> {
    tweets.iter().map(tweet_to_response).collect()
}

/// Convert Notification to NotificationResponse
pub fn notification_to_response(notification: &Notification) -> NotificationResponse {
    NotificationResponse {
        id: notification.id.clone(),
        recipient_id: notification.recipient_id.clone(),
        sender_id: notification.sender_id.clone(),
        sender_username: notification.sender_username.clone(),
        notification_type: notification.notification_type.clone(),
        tweet_id: notification.tweet_id.clone(),
        tweet_content: notification.tweet_content.clone(),
        comment_id: notification.comment_id.clone(),
        comment_content: notification.comment_content.clone(),
        read: notification.read,
        created_at: notification.created_at,
    }
}

pub fn bookmark_to_response(bookmark: &Bookmark) -> BookmarkResponse {
    BookmarkResponse {
        id: bookmark.id.clone(),
        tweet_id: bookmark.tweet_id.clone(),
        created_at: bookmark.created_at,
    }
}

pub fn hashtag_to_response(stat: &HashtagStat) -> HashtagResponse {
    HashtagResponse {
        name: stat.name.clone(),
        usage_count: stat.usage_count,
        last_used_at: stat.last_used_at,
    }
}

pub fn reaction_summary_to_response(summary: ReactionSummary) -> ReactionSummaryResponse {
    ReactionSummaryResponse {
        tweet_id: summary.tweet_id,
        reaction_count: summary.reaction_count,
        reactions: summary.reactions.into_iter().collect(),
    }
}
