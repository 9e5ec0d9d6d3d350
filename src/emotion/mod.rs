//! Emotion detection
//!
//! Faces and per-emotion scores come from an external classifier behind
//! the [`EmotionClassifier`] trait. This module turns those scores into
//! the dominant emotion used for tweet reactions.

mod client;

pub use client::{DisabledEmotionClassifier, HttpEmotionClassifier};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AppError;

/// One face as reported by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Bounding box `[x, y, width, height]` in pixels
    #[serde(rename = "box")]
    pub bounding_box: [i64; 4],
    /// Score per emotion label, 0.0..=1.0
    pub emotions: BTreeMap<String, f64>,
}

/// A detected face with its dominant emotion resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceAnalysis {
    #[serde(rename = "box")]
    pub bounding_box: [i64; 4],
    pub emotions: BTreeMap<String, f64>,
    pub dominant_emotion: String,
    pub confidence: f64,
}

/// Image → faces classifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Detect faces and their emotion scores. No faces is `Ok(vec![])`.
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, AppError>;
}

/// Decode a base64 image, accepting an optional `data:<mime>;base64,` prefix
pub fn decode_image(input: &str) -> Result<Vec<u8>, AppError> {
    let trimmed = input.trim();
    let encoded = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| AppError::Validation("Malformed data URL".to_string()))?,
        None => trimmed,
    };

    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::Validation("Image is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Image is empty".to_string()));
    }

    Ok(bytes)
}

/// Highest-scoring emotion. Ties keep the alphabetically first label.
pub fn dominant_emotion(emotions: &BTreeMap<String, f64>) -> Option<(String, f64)> {
    let mut best: Option<(&String, f64)> = None;
    for (label, score) in emotions {
        match best {
            Some((_, best_score)) if *score <= best_score => {}
            _ => best = Some((label, *score)),
        }
    }
    best.map(|(label, score)| (label.clone(), score))
}

/// Resolve the dominant emotion of each face, skipping faces without scores
pub fn analyze_faces(faces: Vec<DetectedFace>) -> Vec<FaceAnalysis> {
    faces
        .into_iter()
        .filter_map(|face| {
            let (dominant_emotion, confidence) = dominant_emotion(&face.emotions)?;
            Some(FaceAnalysis {
                bounding_box: face.bounding_box,
                emotions: face.emotions,
                dominant_emotion,
                confidence,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect()
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        assert_eq!(decode_image("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_image("data:image/jpeg;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_image("not base64!!"),
            Err(AppError::Validation(_))
        ));
        assert!(decode_image("data:image/png;base64").is_err());
        assert!(decode_image("").is_err());
    }

    #[test]
    fn test_dominant_emotion_picks_max() {
        let emotions = scores(&[("angry", 0.1), ("happy", 0.7), ("sad", 0.2)]);
        assert_eq!(
            dominant_emotion(&emotions),
            Some(("happy".to_string(), 0.7))
        );
    }

    #[test]
    fn test_dominant_emotion_tie_is_deterministic() {
        let emotions = scores(&[("surprise", 0.5), ("happy", 0.5)]);
        assert_eq!(
            dominant_emotion(&emotions),
            Some(("happy".to_string(), 0.5))
        );
        assert_eq!(dominant_emotion(&BTreeMap::new()), None);
    }

    #[test]
    fn test_analyze_faces_skips_faces_without_scores() {
        let faces = vec![
            DetectedFace {
                bounding_box: [1, 2, 3, 4],
                emotions: scores(&[("neutral", 0.9), ("sad", 0.1)]),
            },
            DetectedFace {
                bounding_box: [5, 6, 7, 8],
                emotions: BTreeMap::new(),
            },
        ];

        let analyzed = analyze_faces(faces);
        assert_eq!(analyzed.len(), 1);
        assert_eq!(analyzed[0].dominant_emotion, "neutral");
        assert_eq!(analyzed[0].bounding_box, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_mock_classifier_is_usable_as_trait_object() {
        let mut mock = MockEmotionClassifier::new();
        mock.expect_detect().returning(|_| Ok(vec![]));

        let classifier: std::sync::Arc<dyn EmotionClassifier> = std::sync::Arc::new(mock);
        assert!(classifier.detect(b"img").await.unwrap().is_empty());
    }
}
