//! Identity service
//!
//! Registration, credential checks, tokens and profile updates.

use chrono::Utc;
use std::sync::Arc;

use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::auth::{Claims, create_token};
use crate::config::AuthConfig;
use crate::data::{Database, EntityId, ProfilePatch, User};
use crate::error::AppError;
use crate::metrics::{USERS_TOTAL, record_action};

const MAX_USERNAME_CHARS: usize = 30;
const MIN_PASSWORD_CHARS: usize = 8;
const MAX_BIO_CHARS: usize = 160;

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("Username cannot be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AppError::Validation(format!(
            "Username cannot exceed {} characters",
            MAX_USERNAME_CHARS
        )));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Validation(
            "Username may only contain letters, digits and underscores".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(AppError::Validation("Invalid email address".to_string())),
    }
}

fn validate_picture_url(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(AppError::Validation(format!("{} must be an http(s) URL", field))),
    }
}

/// Identity service
pub struct IdentityService {
    db: Arc<Database>,
    auth: AuthConfig,
}

impl IdentityService {
    /// Create new identity service
    pub fn new(db: Arc<Database>, auth: AuthConfig) -> Self {
        Self { db, auth }
    }

    /// Register a new user
    ///
    /// # Errors
    /// `Validation` when the username or email is taken or malformed
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();
        let email = email.trim();
        validate_username(username)?;
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_CHARS
            )));
        }

        // Specific messages first; the unique indexes still decide races.
        if self.db.get_user_by_username(username).await?.is_some() {
            return Err(AppError::Validation("Username already taken".to_string()));
        }
        if self.db.get_user_by_email(email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".to_string()));
        }

        let password = password.to_string();
        let hashed_password = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            email: email.to_string(),
            hashed_password,
            bio: None,
            profile_picture_url: None,
            banner_picture_url: None,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        };

        if !self.db.insert_user(&user).await? {
            return Err(AppError::Validation(
                "Username or email already registered".to_string(),
            ));
        }

        record_action("register");
        USERS_TOTAL.inc();
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// # Returns
    /// `None` for an unknown user or a wrong password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        let Some(user) = self.db.get_user_by_username(username.trim()).await? else {
            let password = password.to_string();
            tokio::task::spawn_blocking(move || verify_against_dummy(&password))
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
            return Ok(None);
        };

        let password = password.to_string();
        let stored_hash = user.hashed_password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        if !matches {
            tracing::debug!(username = %user.username, "Password mismatch");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Issue a bearer token for `user`
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims::new(&user.username, self.auth.token_ttl_minutes);
        create_token(&claims, &self.auth.token_secret)
    }

    /// Public profile by username
    pub async fn get_user(&self, username: &str) -> Result<User, AppError> {
        self.db
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    /// Update the caller's profile fields
    pub async fn update_profile(&self, user: &User, patch: ProfilePatch) -> Result<User, AppError> {
        let patch = ProfilePatch {
            bio: patch.bio.map(|bio| bio.trim().to_string()),
            profile_picture_url: patch.profile_picture_url.map(|url| url.trim().to_string()),
            banner_picture_url: patch.banner_picture_url.map(|url| url.trim().to_string()),
        };

        if let Some(bio) = &patch.bio {
            if bio.chars().count() > MAX_BIO_CHARS {
                return Err(AppError::Validation(format!(
                    "Bio cannot exceed {} characters",
                    MAX_BIO_CHARS
                )));
            }
        }
        if let Some(url) = &patch.profile_picture_url {
            validate_picture_url("profile_picture_url", url)?;
        }
        if let Some(url) = &patch.banner_picture_url {
            validate_picture_url("banner_picture_url", url)?;
        }

        self.db
            .update_user_profile(&user.id, &patch)
            .await?
            .ok_or(AppError::NotFound("User"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_token;
    use tempfile::TempDir;

    const SECRET: &str = "test-secret-key-32-bytes-long!!!";

    async fn setup() -> (IdentityService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(Database::connect(&temp_dir.path().join("test.db")).await.unwrap());
        let auth = AuthConfig {
            token_secret: SECRET.to_string(),
            token_ttl_minutes: 30,
        };
        (IdentityService::new(db, auth), temp_dir)
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let (service, _temp_dir) = setup().await;

        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();
        assert_ne!(user.hashed_password, "password123");

        let authenticated = service.authenticate("alice", "password123").await.unwrap();
        assert_eq!(authenticated.map(|u| u.id), Some(user.id));

        assert!(service.authenticate("alice", "wrong-password").await.unwrap().is_none());
        assert!(service.authenticate("nobody", "password123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_fail() {
        let (service, _temp_dir) = setup().await;
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let duplicate_name = service
            .register("ALICE", "other@example.com", "password123")
            .await;
        assert!(matches!(
            duplicate_name,
            Err(AppError::Validation(message)) if message == "Username already taken"
        ));

        let duplicate_email = service
            .register("alice2", "Alice@Example.com", "password123")
            .await;
        assert!(matches!(
            duplicate_email,
            Err(AppError::Validation(message)) if message == "Email already registered"
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, _temp_dir) = setup().await;

        assert!(service.register("", "a@example.com", "password123").await.is_err());
        assert!(service.register("bad name", "a@example.com", "password123").await.is_err());
        assert!(service.register(&"a".repeat(31), "a@example.com", "password123").await.is_err());
        assert!(service.register("alice", "not-an-email", "password123").await.is_err());
        assert!(service.register("alice", "@example.com", "password123").await.is_err());
        assert!(service.register("alice", "a@example.com", "short").await.is_err());
    }

    #[tokio::test]
    async fn test_issue_token_names_user() {
        let (service, _temp_dir) = setup().await;
        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let token = service.issue_token(&user).unwrap();
        assert_eq!(verify_token(&token, SECRET).unwrap().sub, "alice");
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let (service, _temp_dir) = setup().await;
        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let updated = service
            .update_profile(
                &user,
                ProfilePatch {
                    bio: Some("  hello there ".to_string()),
                    profile_picture_url: Some("https://img.example/a.png".to_string()),
                    banner_picture_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("hello there"));

        let updated = service
            .update_profile(
                &user,
                ProfilePatch {
                    banner_picture_url: Some("https://img.example/b.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("hello there"));
        assert_eq!(
            updated.banner_picture_url.as_deref(),
            Some("https://img.example/b.png")
        );

        let invalid = service
            .update_profile(
                &user,
                ProfilePatch {
                    profile_picture_url: Some("javascript:alert(1)".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));
    }
}
