//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chirp::emotion::{DetectedFace, EmotionClassifier};
use chirp::error::AppError;
use chirp::{AppState, config};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Image bytes the stub classifier treats as "no face in frame"
pub const NO_FACE_IMAGE: &[u8] = b"empty-room";

/// Classifier that sees one happy face in every image except [`NO_FACE_IMAGE`]
pub struct StubClassifier;

#[async_trait]
impl EmotionClassifier for StubClassifier {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, AppError> {
        if image == NO_FACE_IMAGE {
            return Ok(vec![]);
        }

        let emotions = BTreeMap::from([
            ("happy".to_string(), 0.9),
            ("neutral".to_string(), 0.08),
            ("sad".to_string(), 0.02),
        ]);
        Ok(vec![DetectedFace {
            bounding_box: [10, 20, 100, 100],
            emotions,
        }])
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server with the stub emotion classifier
    pub async fn new() -> Self {
        Self::start(true).await
    }

    /// Create a test server with no emotion classifier configured
    pub async fn without_classifier() -> Self {
        Self::start(false).await
    }

    async fn start(with_classifier: bool) -> Self {
        chirp::metrics::init_metrics();

        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = test_config(db_path);

        let mut state = AppState::new(config).await.unwrap();
        if with_classifier {
            state = state.with_emotion_classifier(Arc::new(StubClassifier));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = chirp::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user with password "password123"
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .client
            .post(self.url("/users"))
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "registering {}", username);
        response.json().await.unwrap()
    }

    /// POST /token with a form body, returning the raw response
    pub async fn login_response(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/token"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(format!("username={}&password={}", username, password))
            .send()
            .await
            .unwrap()
    }

    /// Log in and return the bearer token
    pub async fn login(&self, username: &str) -> String {
        let response = self.login_response(username, "password123").await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register then log in
    pub async fn register_and_login(&self, username: &str) -> String {
        self.register(username).await;
        self.login(username).await
    }

    /// Post a tweet and return its JSON
    pub async fn post_tweet(&self, token: &str, content: &str) -> Value {
        let response = self
            .client
            .post(self.url("/tweets"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    /// GET a path and decode the JSON body
    pub async fn get_json(&self, path: &str, token: Option<&str>) -> Value {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 200, "GET {}", path);
        response.json().await.unwrap()
    }
}

fn test_config(db_path: std::path::PathBuf) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            cors_origins: vec![],
        },
        database: config::DatabaseConfig { path: db_path },
        auth: config::AuthConfig {
            token_secret: "test-secret-key-that-is-32-bytes-long!!".to_string(),
            token_ttl_minutes: 60,
        },
        timeline: config::TimelineConfig {
            default_limit: 50,
            max_limit: 100,
            trending_window_hours: 24,
        },
        emotion: config::EmotionConfig::default(),
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}
