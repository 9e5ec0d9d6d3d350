//! Graph service
//!
//! Follow edges and the follower/following counters they drive.

use chrono::Utc;
use std::sync::Arc;

use super::engagement::Notifier;
use crate::data::{Database, EntityId, Follow, NotificationType, User};
use crate::error::AppError;
use crate::metrics::record_action;

/// Follower/following counts for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub followers_count: i64,
    pub following_count: i64,
}

/// Graph service
pub struct GraphService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl GraphService {
    /// Create new graph service
    pub fn new(db: Arc<Database>) -> Self {
        let notifier = Notifier::new(db.clone());
        Self { db, notifier }
    }

    async fn require_user(&self, username: &str) -> Result<User, AppError> {
        self.db
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    /// Follow `username`
    pub async fn follow(&self, follower: &User, username: &str) -> Result<Follow, AppError> {
        let target = self.require_user(username).await?;
        if target.id == follower.id {
            return Err(AppError::Validation("You cannot follow yourself".to_string()));
        }

        let follow = Follow {
            id: EntityId::new().0,
            follower_id: follower.id.clone(),
            follower_username: follower.username.clone(),
            followed_id: target.id.clone(),
            followed_username: target.username.clone(),
            created_at: Utc::now(),
        };

        if !self.db.insert_follow(&follow).await? {
            return Err(AppError::Validation(
                "You already follow this user".to_string(),
            ));
        }

        record_action("follow");
        tracing::info!(
            follower = %follower.username,
            followed = %target.username,
            "Follow created"
        );
        self.notifier
            .notify(&target.id, follower, NotificationType::Follow, None, None)
            .await;

        Ok(follow)
    }

    /// Unfollow `username`
    pub async fn unfollow(&self, follower: &User, username: &str) -> Result<(), AppError> {
        let target = self.require_user(username).await?;

        if !self.db.delete_follow(&follower.id, &target.id).await? {
            return Err(AppError::NotFound("Follow"));
        }

        record_action("unfollow");
        tracing::info!(
            follower = %follower.username,
            followed = %target.username,
            "Follow removed"
        );
        Ok(())
    }

    /// Whether `follower` follows `username`
    pub async fn follow_status(&self, follower: &User, username: &str) -> Result<bool, AppError> {
        let target = self.require_user(username).await?;
        self.db.is_following(&follower.id, &target.id).await
    }

    /// Users following `username`
    pub async fn followers(&self, username: &str) -> Result<Vec<User>, AppError> {
        let user = self.require_user(username).await?;
        self.db.list_followers(&user.id).await
    }

    /// Users `username` follows
    pub async fn following(&self, username: &str) -> Result<Vec<User>, AppError> {
        let user = self.require_user(username).await?;
        self.db.list_following(&user.id).await
    }

    /// Denormalized follow counters for `username`
    pub async fn stats(&self, username: &str) -> Result<UserStats, AppError> {
        let user = self.require_user(username).await?;
        Ok(UserStats {
            followers_count: user.followers_count,
            following_count: user.following_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (GraphService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(Database::connect(&temp_dir.path().join("test.db")).await.unwrap());
        (GraphService::new(db.clone()), db, temp_dir)
    }

    async fn seed_user(db: &Database, username: &str) -> User {
        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            hashed_password: "hash".to_string(),
            bio: None,
            profile_picture_url: None,
            banner_picture_url: None,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        };
        db.insert_user(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_follow_then_unfollow_restores_counts() {
        let (service, db, _temp_dir) = setup().await;
        let alice = seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        service.follow(&alice, "bob").await.unwrap();
        assert_eq!(
            service.stats("bob").await.unwrap(),
            UserStats { followers_count: 1, following_count: 0 }
        );
        assert_eq!(
            service.stats("alice").await.unwrap(),
            UserStats { followers_count: 0, following_count: 1 }
        );
        assert!(service.follow_status(&alice, "bob").await.unwrap());

        service.unfollow(&alice, "bob").await.unwrap();
        assert_eq!(
            service.stats("bob").await.unwrap(),
            UserStats { followers_count: 0, following_count: 0 }
        );
        assert_eq!(
            service.stats("alice").await.unwrap(),
            UserStats { followers_count: 0, following_count: 0 }
        );
    }

    #[tokio::test]
    async fn test_follow_errors() {
        let (service, db, _temp_dir) = setup().await;
        let alice = seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        assert!(matches!(
            service.follow(&alice, "nobody").await,
            Err(AppError::NotFound("User"))
        ));
        assert!(matches!(
            service.follow(&alice, "alice").await,
            Err(AppError::Validation(_))
        ));

        service.follow(&alice, "bob").await.unwrap();
        assert!(matches!(
            service.follow(&alice, "bob").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(service.stats("bob").await.unwrap().followers_count, 1);

        service.unfollow(&alice, "bob").await.unwrap();
        assert!(matches!(
            service.unfollow(&alice, "bob").await,
            Err(AppError::NotFound("Follow"))
        ));
    }

    #[tokio::test]
    async fn test_follow_notifies_target_and_lists() {
        let (service, db, _temp_dir) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;

        service.follow(&alice, "bob").await.unwrap();

        let notifications = db.list_notifications(&bob.id, 50, None, false).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, "follow");
        assert_eq!(notifications[0].sender_username, "alice");

        let followers = service.followers("bob").await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].username, "alice");
        assert_eq!(service.following("alice").await.unwrap()[0].username, "bob");
    }
}
