//! chirp - a small social network backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Users, tweets, notifications, hashtags                   │
//! │  - Emotion reactions                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Identity, content, graph, engagement                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx), one table per collection                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and DTOs
//! - `service`: Business logic layer
//! - `data`: Database layer
//! - `emotion`: Emotion classifier seam
//! - `auth`: Passwords, bearer tokens, current-user extraction
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod emotion;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the database pool and the emotion classifier.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Emotion classifier (disabled when no endpoint is configured)
    pub emotion_classifier: Arc<dyn emotion::EmotionClassifier>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Seed gauges from stored counts
    /// 3. Build the emotion classifier client
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to SQLite database
        let db = data::Database::connect(&config.database.path).await?;
        tracing::info!("Database connected");

        // 2. Seed gauges
        metrics::USERS_TOTAL.set(db.count_users().await?);
        metrics::TWEETS_TOTAL.set(db.count_tweets().await?);

        // 3. Emotion classifier
        let emotion_classifier: Arc<dyn emotion::EmotionClassifier> =
            match emotion::HttpEmotionClassifier::from_config(&config.emotion)? {
                Some(classifier) => {
                    tracing::info!("Emotion classifier configured");
                    Arc::new(classifier)
                }
                None => {
                    tracing::warn!(
                        "emotion.classifier_url is not set; emotion endpoints will answer 501"
                    );
                    Arc::new(emotion::DisabledEmotionClassifier)
                }
            };

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            emotion_classifier,
        })
    }

    /// Replace the emotion classifier
    pub fn with_emotion_classifier(
        mut self,
        classifier: Arc<dyn emotion::EmotionClassifier>,
    ) -> Self {
        self.emotion_classifier = classifier;
        self
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower::ServiceBuilder;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::api_router(&state))
        .route_layer(axum::middleware::from_fn(api::metrics::track_http_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer),
        )
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{AllowOrigin, Any, CorsLayer};

    if server.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check() -> &'static str {
    "OK"
}
