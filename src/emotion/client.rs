//! Classifier implementations

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use std::time::{Duration, Instant};

use super::{DetectedFace, EmotionClassifier};
use crate::config::EmotionConfig;
use crate::error::AppError;
use crate::metrics::{CLASSIFIER_REQUEST_DURATION_SECONDS, CLASSIFIER_REQUESTS_TOTAL};

/// Classifier reached over HTTP
///
/// Sends `POST <classifier_url>` with `{"image": "<base64>"}` and expects a
/// JSON array of `{"box": [x, y, w, h], "emotions": {label: score}}`.
pub struct HttpEmotionClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEmotionClassifier {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chirp/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Build from configuration; `None` when no endpoint is configured
    pub fn from_config(config: &EmotionConfig) -> Result<Option<Self>, AppError> {
        match &config.classifier_url {
            Some(url) => Ok(Some(Self::new(
                url.clone(),
                Duration::from_secs(config.timeout_seconds),
            )?)),
            None => Ok(None),
        }
    }

    async fn call(&self, image: &[u8]) -> Result<Vec<DetectedFace>, AppError> {
        let body = serde_json::json!({
            "image": general_purpose::STANDARD.encode(image),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Classifier(format!(
                "classifier returned HTTP {}",
                status
            )));
        }

        response
            .json::<Vec<DetectedFace>>()
            .await
            .map_err(|e| AppError::Classifier(format!("invalid classifier response: {}", e)))
    }
}

#[async_trait]
impl EmotionClassifier for HttpEmotionClassifier {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, AppError> {
        let start = Instant::now();
        let result = self.call(image).await;

        let status = if result.is_ok() { "success" } else { "error" };
        CLASSIFIER_REQUESTS_TOTAL.with_label_values(&[status]).inc();
        CLASSIFIER_REQUEST_DURATION_SECONDS
            .with_label_values(&[status])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(faces) => tracing::debug!(faces = faces.len(), "Emotion classifier answered"),
            Err(error) => tracing::warn!(%error, endpoint = %self.endpoint, "Emotion classifier failed"),
        }

        result
    }
}

/// Stand-in used when no classifier endpoint is configured
pub struct DisabledEmotionClassifier;

#[async_trait]
impl EmotionClassifier for DisabledEmotionClassifier {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<DetectedFace>, AppError> {
        Err(AppError::NotImplemented(
            "Emotion detection is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_classifier_answers_not_implemented() {
        let result = DisabledEmotionClassifier.detect(b"image").await;
        assert!(matches!(result, Err(AppError::NotImplemented(_))));
    }

    #[test]
    fn test_from_config_without_url_is_none() {
        let config = EmotionConfig::default();
        assert!(HttpEmotionClassifier::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_classifier_is_http_client_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let classifier =
            HttpEmotionClassifier::new("http://127.0.0.1:9/detect".to_string(), Duration::from_secs(2))
                .unwrap();

        let result = classifier.detect(b"image").await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }
}
