//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override, `CHIRP__SECTION__KEY`)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub emotion: EmotionConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8000)
    pub port: u16,
    /// Allowed CORS origins; empty means permissive (development)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Bearer token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret (32+ bytes)
    pub token_secret: String,
    /// Token lifetime in minutes
    pub token_ttl_minutes: i64,
}

/// Listing limits
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    /// Page size when the client does not ask for one
    pub default_limit: usize,
    /// Upper bound on any requested page size
    pub max_limit: usize,
    /// Window for trending hashtags, in hours
    pub trending_window_hours: i64,
}

impl TimelineConfig {
    /// Clamp a requested page size into `1..=max_limit`
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

/// Emotion classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmotionConfig {
    /// Base URL of the classifier service; unset disables the feature
    pub classifier_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum accepted request body for image uploads, in bytes
    pub max_image_bytes: usize,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            classifier_url: None,
            timeout_seconds: 10,
            max_image_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub fn default_directives(&self) -> String {
        format!("chirp={0},tower_http={0}", self.level.to_lowercase())
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (CHIRP__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("database.path", "data/chirp.db")?
            .set_default("auth.token_ttl_minutes", 60)?
            .set_default("timeline.default_limit", 50)?
            .set_default("timeline.max_limit", 100)?
            .set_default("timeline.trending_window_hours", 24 * 7)?
            .set_default("emotion.timeout_seconds", 10)?
            .set_default("emotion.max_image_bytes", 8 * 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (CHIRP__*)
            .add_source(
                Environment::with_prefix("CHIRP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;

        if self.auth.token_secret.as_bytes().len() < MIN_TOKEN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_secret must be at least {} bytes",
                MIN_TOKEN_SECRET_BYTES
            )));
        }

        if self.auth.token_ttl_minutes <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.token_ttl_minutes must be greater than 0".to_string(),
            ));
        }

        if self.timeline.max_limit == 0
            || self.timeline.default_limit == 0
            || self.timeline.default_limit > self.timeline.max_limit
        {
            return Err(crate::error::AppError::Config(
                "timeline.default_limit must be between 1 and timeline.max_limit".to_string(),
            ));
        }

        if self.timeline.trending_window_hours <= 0 {
            return Err(crate::error::AppError::Config(
                "timeline.trending_window_hours must be greater than 0".to_string(),
            ));
        }

        if let Some(classifier_url) = &self.emotion.classifier_url {
            let parsed = url::Url::parse(classifier_url).map_err(|e| {
                crate::error::AppError::Config(format!("emotion.classifier_url is invalid: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(crate::error::AppError::Config(
                    "emotion.classifier_url must use http or https".to_string(),
                ));
            }
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(crate::error::AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error (got {})",
                self.logging.level
            )));
        }

        if !matches!(self.logging.format.to_lowercase().as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(
                "logging.format must be \"pretty\" or \"json\"".to_string(),
            ));
        }

        Ok(())
    }
}
