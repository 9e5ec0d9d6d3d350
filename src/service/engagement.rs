//! Engagement service
//!
//! Notifications, trending hashtags and emotion reactions.

use chrono::{Duration, Utc};
use std::sync::Arc;

use super::text::preview;
use crate::data::{
    Comment, Database, EmotionReaction, EntityId, HashtagStat, Notification, NotificationType,
    Tweet, User,
};
use crate::emotion::{EmotionClassifier, FaceAnalysis, analyze_faces, decode_image};
use crate::error::AppError;
use crate::metrics::{NOTIFICATIONS_TOTAL, record_action};

/// Reaction counts for one tweet
#[derive(Debug, Clone)]
pub struct ReactionSummary {
    pub tweet_id: String,
    pub reaction_count: i64,
    pub reactions: Vec<(String, i64)>,
}

/// Writes notifications after the primary write has committed
///
/// Delivery is best-effort: failures are logged and counted, never
/// returned to the caller.
#[derive(Clone)]
pub struct Notifier {
    db: Arc<Database>,
}

impl Notifier {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Notify `recipient_id` of an action by `sender`
    ///
    /// Self-notifications are skipped.
    pub async fn notify(
        &self,
        recipient_id: &str,
        sender: &User,
        kind: NotificationType,
        tweet: Option<&Tweet>,
        comment: Option<&Comment>,
    ) {
        if recipient_id == sender.id {
            return;
        }

        let notification = Notification {
            id: EntityId::new().0,
            recipient_id: recipient_id.to_string(),
            sender_id: sender.id.clone(),
            sender_username: sender.username.clone(),
            notification_type: kind.as_str().to_string(),
            tweet_id: tweet.map(|t| t.id.clone()),
            tweet_content: tweet.map(|t| preview(&t.content)),
            comment_id: comment.map(|c| c.id.clone()),
            comment_content: comment.map(|c| preview(&c.content)),
            read: false,
            created_at: Utc::now(),
        };

        match self.db.insert_notification(&notification).await {
            Ok(()) => {
                NOTIFICATIONS_TOTAL
                    .with_label_values(&[kind.as_str(), "created"])
                    .inc();
            }
            Err(error) => {
                NOTIFICATIONS_TOTAL
                    .with_label_values(&[kind.as_str(), "failed"])
                    .inc();
                tracing::warn!(
                    %error,
                    recipient_id,
                    sender_id = %sender.id,
                    notification_type = kind.as_str(),
                    "Failed to store notification"
                );
            }
        }
    }
}

/// Engagement service
pub struct EngagementService {
    db: Arc<Database>,
    classifier: Arc<dyn EmotionClassifier>,
}

impl EngagementService {
    /// Create new engagement service
    pub fn new(db: Arc<Database>, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { db, classifier }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Caller's notifications, newest first
    pub async fn list_notifications(
        &self,
        user: &User,
        limit: usize,
        max_id: Option<&str>,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        if let Some(max_id) = max_id {
            if !self.db.notification_exists(&user.id, max_id).await? {
                return Err(AppError::NotFound("Cursor"));
            }
        }

        self.db
            .list_notifications(&user.id, limit, max_id, unread_only)
            .await
    }

    /// Count of the caller's unread notifications
    pub async fn unread_count(&self, user: &User) -> Result<i64, AppError> {
        self.db.count_unread_notifications(&user.id).await
    }

    /// Mark one notification read; 404 unless it belongs to the caller
    pub async fn mark_read(&self, user: &User, notification_id: &str) -> Result<(), AppError> {
        if !self
            .db
            .mark_notification_read(&user.id, notification_id)
            .await?
        {
            return Err(AppError::NotFound("Notification"));
        }
        Ok(())
    }

    /// Mark all of the caller's notifications read
    ///
    /// # Returns
    /// Number of notifications that changed state
    pub async fn mark_all_read(&self, user: &User) -> Result<u64, AppError> {
        self.db.mark_all_notifications_read(&user.id).await
    }

    // =========================================================================
    // Hashtags
    // =========================================================================

    /// Most used hashtags within the trending window
    pub async fn trending_hashtags(
        &self,
        window_hours: i64,
        limit: usize,
    ) -> Result<Vec<HashtagStat>, AppError> {
        self.db
            .trending_hashtags(Duration::hours(window_hours), limit)
            .await
    }

    // =========================================================================
    // Emotion reactions
    // =========================================================================

    /// Analyze an image without storing anything
    ///
    /// An image without faces yields an empty list.
    pub async fn detect_emotion(&self, image: &str) -> Result<Vec<FaceAnalysis>, AppError> {
        let bytes = decode_image(image)?;
        let faces = self.classifier.detect(&bytes).await?;
        Ok(analyze_faces(faces))
    }

    async fn require_tweet(&self, id: &str) -> Result<Tweet, AppError> {
        self.db.get_tweet(id).await?.ok_or(AppError::NotFound("Tweet"))
    }

    /// Store the caller's reaction to a tweet from the first detected face
    ///
    /// Replaces any previous reaction by the caller on that tweet.
    pub async fn react(
        &self,
        user: &User,
        tweet_id: &str,
        image: &str,
    ) -> Result<EmotionReaction, AppError> {
        self.require_tweet(tweet_id).await?;

        let face = self
            .detect_emotion(image)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Validation("No face detected in the image".to_string()))?;

        let reaction = EmotionReaction {
            id: EntityId::new().0,
            tweet_id: tweet_id.to_string(),
            user_id: user.id.clone(),
            emotion: face.dominant_emotion,
            confidence: face.confidence,
            created_at: Utc::now(),
        };

        let stored = self.db.upsert_emotion_reaction(&reaction).await?;
        record_action("react");
        tracing::info!(
            tweet_id,
            user_id = %user.id,
            emotion = %stored.emotion,
            "Emotion reaction stored"
        );
        Ok(stored)
    }

    /// Reactions on a tweet
    pub async fn list_reactions(&self, tweet_id: &str) -> Result<Vec<EmotionReaction>, AppError> {
        self.require_tweet(tweet_id).await?;
        self.db.list_emotion_reactions(tweet_id).await
    }

    /// Reaction counts per emotion on a tweet
    pub async fn reaction_summary(&self, tweet_id: &str) -> Result<ReactionSummary, AppError> {
        self.require_tweet(tweet_id).await?;
        let reactions = self.db.count_emotion_reactions(tweet_id).await?;
        let reaction_count = reactions.iter().map(|(_, count)| count).sum();

        Ok(ReactionSummary {
            tweet_id: tweet_id.to_string(),
            reaction_count,
            reactions,
        })
    }

    /// Remove the caller's reaction on a tweet
    pub async fn delete_reaction(&self, user: &User, tweet_id: &str) -> Result<(), AppError> {
        if !self.db.delete_emotion_reaction(tweet_id, &user.id).await? {
            return Err(AppError::NotFound("Reaction"));
        }
        Ok(())
    }
}
