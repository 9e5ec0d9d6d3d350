//! SQLite database operations
//!
//! All database access goes through this module. Each collection
//! (`users`, `tweets`, `follows`, ...) is one table.
//!
//! Edge inserts/deletes (follow, like, retweet, bookmark) and the
//! denormalized counters they drive are written in a single transaction,
//! and uniqueness is enforced by unique indexes with `ON CONFLICT DO NOTHING`.
//! Callers learn whether the edge changed from the returned `bool`.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Append a keyset cursor on `(created_at, id)` for the tweets table.
///
/// `prefix` is the table alias including the dot (`""` or `"t."`).
/// An unknown `max_id` matches nothing; callers check the cursor first.
fn push_tweet_cursor(query: &mut QueryBuilder<'_, Sqlite>, prefix: &str, max_id: Option<&str>) {
    if let Some(max_id) = max_id {
        query.push(format!(
            " AND ({prefix}created_at, {prefix}id) < (SELECT created_at, id FROM tweets WHERE id = "
        ));
        query.push_bind(max_id.to_string());
        query.push(")");
    }
}

fn push_tweet_order_and_limit(query: &mut QueryBuilder<'_, Sqlite>, prefix: &str, limit: usize) {
    query.push(format!(
        " ORDER BY {prefix}created_at DESC, {prefix}id DESC LIMIT "
    ));
    query.push_bind(limit as i64);
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user unless the username or email is taken.
    ///
    /// # Returns
    /// `false` when a unique index rejected the row
    pub async fn insert_user(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, hashed_password, bio, profile_picture_url,
                banner_picture_url, followers_count, following_count, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.bio)
        .bind(&user.profile_picture_url)
        .bind(&user.banner_picture_url)
        .bind(user.followers_count)
        .bind(user.following_count)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Get user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by username (case-insensitive)
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? COLLATE NOCASE")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get multiple users by username (batch operation to avoid N+1)
    pub async fn get_users_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>, AppError> {
        if usernames.is_empty() {
            return Ok(vec![]);
        }

        let mut all_users = Vec::new();
        for chunk in usernames.chunks(100) {
            let mut query_builder =
                QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE username COLLATE NOCASE IN (");
            {
                let mut separated = query_builder.separated(", ");
                for username in chunk {
                    separated.push_bind(username);
                }
            }
            query_builder.push(")");

            let users = query_builder
                .build_query_as::<User>()
                .fetch_all(&self.pool)
                .await?;
            all_users.extend(users);
        }

        Ok(all_users)
    }

    /// Apply a partial profile update and return the stored user
    pub async fn update_user_profile(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                bio = COALESCE(?, bio),
                profile_picture_url = COALESCE(?, profile_picture_url),
                banner_picture_url = COALESCE(?, banner_picture_url)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&patch.bio)
        .bind(&patch.profile_picture_url)
        .bind(&patch.banner_picture_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Count registered users
    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Tweets
    // =========================================================================

    /// Get tweet by ID
    pub async fn get_tweet(&self, id: &str) -> Result<Option<Tweet>, AppError> {
        let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tweet)
    }

    /// Insert an original tweet with its hashtag and mention rows.
    ///
    /// Hashtag stats are bumped in the same transaction.
    pub async fn insert_tweet(
        &self,
        tweet: &Tweet,
        mentioned_user_ids: &[String],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tweets (
                id, content, author_id, author_username, media_url,
                like_count, comment_count, retweet_count, is_retweet,
                original_tweet_id, original_author_username, tags, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tweet.id)
        .bind(&tweet.content)
        .bind(&tweet.author_id)
        .bind(&tweet.author_username)
        .bind(&tweet.media_url)
        .bind(tweet.like_count)
        .bind(tweet.comment_count)
        .bind(tweet.retweet_count)
        .bind(tweet.is_retweet)
        .bind(&tweet.original_tweet_id)
        .bind(&tweet.original_author_username)
        .bind(&tweet.tags)
        .bind(tweet.created_at)
        .execute(&mut *tx)
        .await?;

        for tag in tweet.tags.iter() {
            sqlx::query("INSERT OR IGNORE INTO tweet_hashtags (tweet_id, name) VALUES (?, ?)")
                .bind(&tweet.id)
                .bind(tag)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO hashtags (name, usage_count, last_used_at) VALUES (?, 1, ?)
                ON CONFLICT(name) DO UPDATE SET
                    usage_count = usage_count + 1,
                    last_used_at = excluded.last_used_at
                "#,
            )
            .bind(tag)
            .bind(tweet.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for user_id in mentioned_user_ids {
            sqlx::query("INSERT OR IGNORE INTO mentions (tweet_id, mentioned_user_id) VALUES (?, ?)")
                .bind(&tweet.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a tweet.
    ///
    /// Likes, comments, reactions and join rows cascade. Deleting a retweet
    /// decrements the original's `retweet_count`.
    pub async fn delete_tweet(&self, tweet: &Tweet) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(&tweet.id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted && tweet.is_retweet {
            if let Some(original_id) = &tweet.original_tweet_id {
                sqlx::query(
                    "UPDATE tweets SET retweet_count = MAX(retweet_count - 1, 0) WHERE id = ?",
                )
                .bind(original_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Most recent tweets, newest first
    ///
    /// # Arguments
    /// * `limit` - Maximum number of results
    /// * `max_id` - Return tweets older than this tweet (for pagination)
    pub async fn list_tweets(
        &self,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM tweets WHERE 1 = 1");
        push_tweet_cursor(&mut query, "", max_id);
        push_tweet_order_and_limit(&mut query, "", limit);

        let tweets = query.build_query_as::<Tweet>().fetch_all(&self.pool).await?;
        Ok(tweets)
    }

    /// Tweets (including retweets) authored by a user, newest first
    pub async fn list_tweets_by_author(
        &self,
        author_id: &str,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM tweets WHERE author_id = ");
        query.push_bind(author_id.to_string());
        push_tweet_cursor(&mut query, "", max_id);
        push_tweet_order_and_limit(&mut query, "", limit);

        let tweets = query.build_query_as::<Tweet>().fetch_all(&self.pool).await?;
        Ok(tweets)
    }

    /// Retweets authored by a user, newest first
    pub async fn list_retweets_by_author(
        &self,
        author_id: &str,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT * FROM tweets WHERE is_retweet = 1 AND author_id = ",
        );
        query.push_bind(author_id.to_string());
        push_tweet_cursor(&mut query, "", max_id);
        push_tweet_order_and_limit(&mut query, "", limit);

        let tweets = query.build_query_as::<Tweet>().fetch_all(&self.pool).await?;
        Ok(tweets)
    }

    /// Tweets carrying a hashtag, newest first
    pub async fn list_tweets_by_tag(
        &self,
        tag: &str,
        limit: usize,
        max_id: Option<&str>,
    ) -> Result<Vec<Tweet>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT t.* FROM tweets t INNER JOIN tweet_hashtags h ON h.tweet_id = t.id WHERE h.name = ",
        );
        query.push_bind(tag.to_string());
        push_tweet_cursor(&mut query, "t.", max_id);
        push_tweet_order_and_limit(&mut query, "t.", limit);

        let tweets = query.build_query_as::<Tweet>().fetch_all(&self.pool).await?;
        Ok(tweets)
    }

    /// Count tweets (retweets included)
    pub async fn count_tweets(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tweets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Retweets
    // =========================================================================

    /// Insert a retweet and bump the original's counter.
    ///
    /// # Returns
    /// `false` if this user already retweeted the original
    pub async fn insert_retweet(&self, retweet: &Tweet) -> Result<bool, AppError> {
        let original_id = retweet.original_tweet_id.as_deref().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("retweet is missing original_tweet_id"))
        })?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO tweets (
                id, content, author_id, author_username, media_url,
                like_count, comment_count, retweet_count, is_retweet,
                original_tweet_id, original_author_username, tags, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&retweet.id)
        .bind(&retweet.content)
        .bind(&retweet.author_id)
        .bind(&retweet.author_username)
        .bind(&retweet.media_url)
        .bind(retweet.like_count)
        .bind(retweet.comment_count)
        .bind(retweet.retweet_count)
        .bind(retweet.is_retweet)
        .bind(original_id)
        .bind(&retweet.original_author_username)
        .bind(&retweet.tags)
        .bind(retweet.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query("UPDATE tweets SET retweet_count = retweet_count + 1 WHERE id = ?")
                .bind(original_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Find a user's retweet of a given tweet
    pub async fn find_retweet(
        &self,
        author_id: &str,
        original_tweet_id: &str,
    ) -> Result<Option<Tweet>, AppError> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "SELECT * FROM tweets WHERE is_retweet = 1 AND author_id = ? AND original_tweet_id = ?",
        )
        .bind(author_id)
        .bind(original_tweet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// Remove a user's retweet and decrement the original's counter.
    ///
    /// # Returns
    /// `false` if there was no retweet to remove
    pub async fn delete_retweet(
        &self,
        author_id: &str,
        original_tweet_id: &str,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM tweets WHERE is_retweet = 1 AND author_id = ? AND original_tweet_id = ?",
        )
        .bind(author_id)
        .bind(original_tweet_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if deleted {
            sqlx::query("UPDATE tweets SET retweet_count = MAX(retweet_count - 1, 0) WHERE id = ?")
                .bind(original_tweet_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    // =========================================================================
    // Follow relationships
    // =========================================================================

    /// Insert a follow edge and bump both users' counters.
    ///
    /// # Returns
    /// `false` if the edge already existed
    pub async fn insert_follow(&self, follow: &Follow) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (
                id, follower_id, follower_username, followed_id, followed_username, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(&follow.id)
        .bind(&follow.follower_id)
        .bind(&follow.follower_username)
        .bind(&follow.followed_id)
        .bind(&follow.followed_username)
        .bind(follow.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query("UPDATE users SET followers_count = followers_count + 1 WHERE id = ?")
                .bind(&follow.followed_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE users SET following_count = following_count + 1 WHERE id = ?")
                .bind(&follow.follower_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Delete a follow edge and decrement both users' counters.
    ///
    /// # Returns
    /// `false` if there was no edge
    pub async fn delete_follow(&self, follower_id: &str, followed_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followed_id = ?")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted {
            sqlx::query(
                "UPDATE users SET followers_count = MAX(followers_count - 1, 0) WHERE id = ?",
            )
            .bind(followed_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE users SET following_count = MAX(following_count - 1, 0) WHERE id = ?",
            )
            .bind(follower_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Check whether `follower_id` follows `followed_id`
    pub async fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND followed_id = ?",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Users following `user_id`, most recent follow first
    pub async fn list_followers(&self, user_id: &str) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            INNER JOIN follows f ON f.follower_id = u.id
            WHERE f.followed_id = ?
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users followed by `user_id`, most recent follow first
    pub async fn list_following(&self, user_id: &str) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            INNER JOIN follows f ON f.followed_id = u.id
            WHERE f.follower_id = ?
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Insert a like and bump the tweet's `like_count`.
    ///
    /// # Returns
    /// `false` if the user already liked the tweet
    pub async fn insert_like(&self, like: &Like) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (id, tweet_id, user_id, username, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, tweet_id) DO NOTHING
            "#,
        )
        .bind(&like.id)
        .bind(&like.tweet_id)
        .bind(&like.user_id)
        .bind(&like.username)
        .bind(like.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query("UPDATE tweets SET like_count = like_count + 1 WHERE id = ?")
                .bind(&like.tweet_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Delete a like and decrement the tweet's `like_count`.
    pub async fn delete_like(&self, user_id: &str, tweet_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM likes WHERE user_id = ? AND tweet_id = ?")
            .bind(user_id)
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted {
            sqlx::query("UPDATE tweets SET like_count = MAX(like_count - 1, 0) WHERE id = ?")
                .bind(tweet_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Check if a user liked a tweet
    pub async fn is_liked(&self, user_id: &str, tweet_id: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = ? AND tweet_id = ?")
                .bind(user_id)
                .bind(tweet_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Likes on a tweet, newest first
    pub async fn list_likes(&self, tweet_id: &str) -> Result<Vec<Like>, AppError> {
        let likes = sqlx::query_as::<_, Like>(
            "SELECT * FROM likes WHERE tweet_id = ? ORDER BY created_at DESC",
        )
        .bind(tweet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(likes)
    }

    /// Tweets liked by a user, most recently liked first
    pub async fn list_liked_tweets(&self, user_id: &str, limit: usize) -> Result<Vec<Tweet>, AppError> {
        let tweets = sqlx::query_as::<_, Tweet>(
            r#"
            SELECT t.* FROM tweets t
            INNER JOIN likes l ON l.tweet_id = t.id
            WHERE l.user_id = ?
            ORDER BY l.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Insert a comment and bump the tweet's `comment_count`.
    ///
    /// # Returns
    /// `false` if the tweet no longer exists
    pub async fn insert_comment(&self, comment: &Comment) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query("UPDATE tweets SET comment_count = comment_count + 1 WHERE id = ?")
            .bind(&comment.tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if !bumped {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO comments (id, content, tweet_id, author_id, author_username, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.content)
        .bind(&comment.tweet_id)
        .bind(&comment.author_id)
        .bind(&comment.author_username)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Comments on a tweet, newest first
    pub async fn list_comments(&self, tweet_id: &str) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE tweet_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(tweet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    // =========================================================================
    // Bookmarks
    // =========================================================================

    /// Insert bookmark
    pub async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (id, user_id, tweet_id, created_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, tweet_id) DO NOTHING
            "#,
        )
        .bind(&bookmark.id)
        .bind(&bookmark.user_id)
        .bind(&bookmark.tweet_id)
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete bookmark
    pub async fn delete_bookmark(&self, user_id: &str, tweet_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND tweet_id = ?")
            .bind(user_id)
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tweets bookmarked by a user, most recently bookmarked first
    pub async fn list_bookmarked_tweets(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Tweet>, AppError> {
        let tweets = sqlx::query_as::<_, Tweet>(
            r#"
            SELECT t.* FROM tweets t
            INNER JOIN bookmarks b ON b.tweet_id = t.id
            WHERE b.user_id = ?
            ORDER BY b.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Insert notification
    pub async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_id, sender_id, sender_username, notification_type,
                tweet_id, tweet_content, comment_id, comment_content, read, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.recipient_id)
        .bind(&notification.sender_id)
        .bind(&notification.sender_username)
        .bind(&notification.notification_type)
        .bind(&notification.tweet_id)
        .bind(&notification.tweet_content)
        .bind(&notification.comment_id)
        .bind(&notification.comment_content)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a recipient's notifications (paginated)
    pub async fn list_notifications(
        &self,
        recipient_id: &str,
        limit: usize,
        max_id: Option<&str>,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT * FROM notifications WHERE recipient_id = ");
        query.push_bind(recipient_id.to_string());
        if unread_only {
            query.push(" AND read = 0");
        }
        if let Some(max_id) = max_id {
            query.push(
                " AND (created_at, id) < (SELECT created_at, id FROM notifications WHERE id = ",
            );
            query.push_bind(max_id.to_string());
            query.push(")");
        }
        query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        query.push_bind(limit as i64);

        let notifications = query
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    /// Whether `id` is one of the recipient's notifications
    pub async fn notification_exists(&self, recipient_id: &str, id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE id = ? AND recipient_id = ?",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Count a recipient's unread notifications
    pub async fn count_unread_notifications(&self, recipient_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND read = 0",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one of the recipient's notifications as read
    pub async fn mark_notification_read(&self, recipient_id: &str, id: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE notifications SET read = 1 WHERE id = ? AND recipient_id = ?")
                .bind(id)
                .bind(recipient_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark all of the recipient's notifications as read
    pub async fn mark_all_notifications_read(&self, recipient_id: &str) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE notifications SET read = 1 WHERE recipient_id = ? AND read = 0")
                .bind(recipient_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Emotion reactions
    // =========================================================================

    /// Store a reaction, replacing any previous one by the same user on the tweet
    pub async fn upsert_emotion_reaction(
        &self,
        reaction: &EmotionReaction,
    ) -> Result<EmotionReaction, AppError> {
        let stored = sqlx::query_as::<_, EmotionReaction>(
            r#"
            INSERT INTO emotion_reactions (id, tweet_id, user_id, emotion, confidence, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(tweet_id, user_id) DO UPDATE SET
                id = excluded.id,
                emotion = excluded.emotion,
                confidence = excluded.confidence,
                created_at = excluded.created_at
            RETURNING *
            "#,
        )
        .bind(&reaction.id)
        .bind(&reaction.tweet_id)
        .bind(&reaction.user_id)
        .bind(&reaction.emotion)
        .bind(reaction.confidence)
        .bind(reaction.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Reactions on a tweet, newest first
    pub async fn list_emotion_reactions(&self, tweet_id: &str) -> Result<Vec<EmotionReaction>, AppError> {
        let reactions = sqlx::query_as::<_, EmotionReaction>(
            "SELECT * FROM emotion_reactions WHERE tweet_id = ? ORDER BY created_at DESC",
        )
        .bind(tweet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reactions)
    }

    /// Reaction counts per emotion for a tweet
    ///
    /// # Returns
    /// List of (emotion, count) tuples, most frequent first
    pub async fn count_emotion_reactions(
        &self,
        tweet_id: &str,
    ) -> Result<Vec<(String, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT emotion, COUNT(*) FROM emotion_reactions
            WHERE tweet_id = ?
            GROUP BY emotion
            ORDER BY COUNT(*) DESC, emotion ASC
            "#,
        )
        .bind(tweet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Delete a user's reaction on a tweet
    pub async fn delete_emotion_reaction(&self, tweet_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM emotion_reactions WHERE tweet_id = ? AND user_id = ?")
            .bind(tweet_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Hashtags
    // =========================================================================

    /// Most used hashtags within the trending window
    ///
    /// # Arguments
    /// * `window` - Only hashtags used within this duration are considered
    /// * `limit` - Maximum number of results
    pub async fn trending_hashtags(
        &self,
        window: Duration,
        limit: usize,
    ) -> Result<Vec<HashtagStat>, AppError> {
        let cutoff: DateTime<Utc> = Utc::now() - window;
        let hashtags = sqlx::query_as::<_, HashtagStat>(
            r#"
            SELECT name, usage_count, last_used_at
            FROM hashtags
            WHERE last_used_at IS NOT NULL AND last_used_at >= ?
            ORDER BY usage_count DESC, name ASC
            LIMIT ?
            "#,
        )
        .bind(cutoff)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(hashtags)
    }

    /// Users mentioned by a tweet
    pub async fn list_mentioned_user_ids(&self, tweet_id: &str) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT mentioned_user_id FROM mentions WHERE tweet_id = ?",
        )
        .bind(tweet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
