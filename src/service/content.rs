//! Content service
//!
//! Tweets, retweets, likes, comments and bookmarks.

use chrono::Utc;
use std::sync::Arc;

use super::engagement::Notifier;
use super::text::{extract_hashtags, extract_mentions, normalize_tag, validate_content};
use crate::data::{
    Bookmark, Comment, Database, EntityId, Like, NotificationType, Tweet, User,
};
use crate::error::AppError;
use crate::metrics::{TWEETS_TOTAL, record_action};

/// Content service
pub struct ContentService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl ContentService {
    /// Create new content service
    pub fn new(db: Arc<Database>) -> Self {
        let notifier = Notifier::new(db.clone());
        Self { db, notifier }
    }

    async fn require_tweet(&self, id: &str) -> Result<Tweet, AppError> {
        self.db.get_tweet(id).await?.ok_or(AppError::NotFound("Tweet"))
    }

    /// A `max_id` cursor must name an existing tweet
    async fn require_cursor(&self, max_id: Option<&str>) -> Result<(), AppError> {
        if let Some(max_id) = max_id {
            if self.db.get_tweet(max_id).await?.is_none() {
                return Err(AppError::NotFound("Cursor"));
            }
        }
        Ok(())
    }

    async fn require_user(&self, username: &str) -> Result<User, AppError> {
        self.db
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    // =========================================================================
    // Tweets
    // =========================================================================

    /// Create a tweet
    ///
    /// Extracts hashtags into `tags` and notifies each mentioned user
    /// that exists, once, unless it is the author.
    pub async fn create_tweet(
        &self,
        author: &User,
        content: &str,
        media_url: Option<String>,
    ) -> Result<Tweet, AppError> {
        let content = validate_content(content)?;
        let media_url = media_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let tags = extract_hashtags(&content);
        let mentioned: Vec<User> = self
            .db
            .get_users_by_usernames(&extract_mentions(&content))
            .await?
            .into_iter()
            .filter(|user| user.id != author.id)
            .collect();
        let mentioned_ids: Vec<String> = mentioned.iter().map(|user| user.id.clone()).collect();

        let tweet = Tweet::new(author, content, media_url, tags);
        self.db.insert_tweet(&tweet, &mentioned_ids).await?;

        record_action("tweet");
        TWEETS_TOTAL.inc();
        tracing::info!(
            tweet_id = %tweet.id,
            author = %author.username,
            tags = tweet.tags.len(),
            mentions = mentioned.len(),
            "Tweet created"
        );

        for user in &mentioned {
            self.notifier
                .notify(&user.id, author, NotificationType::Mention, Some(&tweet), None)
                .await;
        }

        Ok(tweet)
    }

    /// Get a tweet by ID
    pub async fn get_tweet(&self, id: &str) -> Result<Tweet, AppError> {
        self.require_tweet(id).await
    }

    /// Delete one of the caller's tweets
    ///
    /// Deleting a retweet gives back the original's `retweet_count`.
    pub async fn delete_tweet(&self, user: &User, id: &str) -> Result<(), AppError> {
        let tweet = self.require_tweet(id).await?;
        if tweet.author_id != user.id {
            return Err(AppError::Forbidden);
        }

        if !self.db.delete_tweet(&tweet).await? {
            return Err(AppError::NotFound("Tweet"));
        }

        TWEETS_TOTAL.dec();
        tracing::info!(tweet_id = %tweet.id, "Tweet deleted");
        Ok(())
    }

    /// Global listing, newest first
    pub async fn list_tweets(&self, limit: usize, max_id: Option<&str>) -> Result<Vec<Tweet>, AppError> {
        self.require_cursor(max_id).await?;
        self.db.list_tweets(limit, max_id).await
    }

    /// Tweets and retweets authored by a user
    pub async fn list_user_tweets(
        &self,
        username: &str,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let user = self.require_user(username).await?;
        self.require_cursor(max_id).await?;
        self.db.list_tweets_by_author(&user.id, limit, max_id).await
    }

    /// Tweets a user liked, most recently liked first
    pub async fn list_liked_tweets(&self, username: &str, limit: usize) -> Result<Vec<Tweet>, AppError> {
        let user = self.require_user(username).await?;
        self.db.list_liked_tweets(&user.id, limit).await
    }

    /// Retweets made by a user
    pub async fn list_retweeted_tweets(
        &self,
        username: &str,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let user = self.require_user(username).await?;
        self.require_cursor(max_id).await?;
        self.db.list_retweets_by_author(&user.id, limit, max_id).await
    }

    /// Tweets carrying a hashtag
    pub async fn list_tag_tweets(
        &self,
        tag: &str,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let tag = normalize_tag(tag);
        if tag.is_empty() {
            return Err(AppError::Validation("Hashtag cannot be empty".to_string()));
        }
        self.require_cursor(max_id).await?;
        self.db.list_tweets_by_tag(&tag, limit, max_id).await
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Like a tweet
    pub async fn like(&self, user: &User, tweet_id: &str) -> Result<Like, AppError> {
        let tweet = self.require_tweet(tweet_id).await?;

        let like = Like {
            id: EntityId::new().0,
            tweet_id: tweet.id.clone(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            created_at: Utc::now(),
        };

        if !self.db.insert_like(&like).await? {
            return Err(AppError::Validation("Tweet already liked".to_string()));
        }

        record_action("like");
        self.notifier
            .notify(&tweet.author_id, user, NotificationType::Like, Some(&tweet), None)
            .await;

        Ok(like)
    }

    /// Remove the caller's like
    pub async fn unlike(&self, user: &User, tweet_id: &str) -> Result<(), AppError> {
        self.require_tweet(tweet_id).await?;

        if !self.db.delete_like(&user.id, tweet_id).await? {
            return Err(AppError::NotFound("Like"));
        }

        record_action("unlike");
        Ok(())
    }

    /// Whether the caller liked the tweet
    pub async fn like_status(&self, user: &User, tweet_id: &str) -> Result<bool, AppError> {
        self.require_tweet(tweet_id).await?;
        self.db.is_liked(&user.id, tweet_id).await
    }

    /// Likes on a tweet
    pub async fn list_likes(&self, tweet_id: &str) -> Result<Vec<Like>, AppError> {
        self.require_tweet(tweet_id).await?;
        self.db.list_likes(tweet_id).await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Comment on a tweet
    pub async fn comment(&self, user: &User, tweet_id: &str, content: &str) -> Result<Comment, AppError> {
        let tweet = self.require_tweet(tweet_id).await?;
        let content = validate_content(content)?;

        let comment = Comment {
            id: EntityId::new().0,
            content,
            tweet_id: tweet.id.clone(),
            author_id: user.id.clone(),
            author_username: user.username.clone(),
            created_at: Utc::now(),
        };

        if !self.db.insert_comment(&comment).await? {
            return Err(AppError::NotFound("Tweet"));
        }

        record_action("comment");
        self.notifier
            .notify(
                &tweet.author_id,
                user,
                NotificationType::Comment,
                Some(&tweet),
                Some(&comment),
            )
            .await;

        Ok(comment)
    }

    /// Comments on a tweet, newest first
    pub async fn list_comments(&self, tweet_id: &str) -> Result<Vec<Comment>, AppError> {
        self.require_tweet(tweet_id).await?;
        self.db.list_comments(tweet_id).await
    }

    // =========================================================================
    // Retweets
    // =========================================================================

    /// Retweet a tweet
    ///
    /// Retweeting a retweet targets its original.
    pub async fn retweet(&self, user: &User, tweet_id: &str) -> Result<Tweet, AppError> {
        let mut original = self.require_tweet(tweet_id).await?;
        if original.is_retweet {
            if let Some(source_id) = original.original_tweet_id.clone() {
                original = self.require_tweet(&source_id).await?;
            }
        }

        let retweet = Tweet::retweet_of(&original, user);
        if !self.db.insert_retweet(&retweet).await? {
            return Err(AppError::Validation("Tweet already retweeted".to_string()));
        }

        record_action("retweet");
        TWEETS_TOTAL.inc();
        self.notifier
            .notify(
                &original.author_id,
                user,
                NotificationType::Retweet,
                Some(&original),
                None,
            )
            .await;

        Ok(retweet)
    }

    /// Remove the caller's retweet of a tweet
    pub async fn unretweet(&self, user: &User, tweet_id: &str) -> Result<(), AppError> {
        if !self.db.delete_retweet(&user.id, tweet_id).await? {
            return Err(AppError::NotFound("Retweet"));
        }

        record_action("unretweet");
        TWEETS_TOTAL.dec();
        Ok(())
    }

    /// Whether the caller retweeted the tweet
    pub async fn retweet_status(&self, user: &User, tweet_id: &str) -> Result<bool, AppError> {
        self.require_tweet(tweet_id).await?;
        Ok(self.db.find_retweet(&user.id, tweet_id).await?.is_some())
    }

    // =========================================================================
    // Bookmarks
    // =========================================================================

    /// Bookmark a tweet
    pub async fn bookmark(&self, user: &User, tweet_id: &str) -> Result<Bookmark, AppError> {
        self.require_tweet(tweet_id).await?;

        let bookmark = Bookmark {
            id: EntityId::new().0,
            user_id: user.id.clone(),
            tweet_id: tweet_id.to_string(),
            created_at: Utc::now(),
        };

        if !self.db.insert_bookmark(&bookmark).await? {
            return Err(AppError::Validation("Tweet already bookmarked".to_string()));
        }

        Ok(bookmark)
    }

    /// Remove a bookmark
    pub async fn unbookmark(&self, user: &User, tweet_id: &str) -> Result<(), AppError> {
        if !self.db.delete_bookmark(&user.id, tweet_id).await? {
            return Err(AppError::NotFound("Bookmark"));
        }
        Ok(())
    }

    /// Caller's bookmarked tweets, most recent first
    pub async fn list_bookmarks(&self, user: &User, limit: usize) -> Result<Vec<Tweet>, AppError> {
        self.db.list_bookmarked_tweets(&user.id, limit).await
    }
}
