//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Once;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chirp_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "chirp_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Domain Metrics
    pub static ref ACTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chirp_actions_total", "Total number of successful user actions"),
        &["action"]
    ).expect("metric can be created");
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chirp_notifications_total", "Total number of notifications by outcome"),
        &["notification_type", "outcome"]
    ).expect("metric can be created");
    pub static ref USERS_TOTAL: IntGauge = IntGauge::new(
        "chirp_users_total",
        "Total number of registered users"
    ).expect("metric can be created");
    pub static ref TWEETS_TOTAL: IntGauge = IntGauge::new(
        "chirp_tweets_total",
        "Total number of tweets, retweets included"
    ).expect("metric can be created");

    // Emotion classifier Metrics
    pub static ref CLASSIFIER_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chirp_classifier_requests_total", "Total number of emotion classifier calls"),
        &["status"]
    ).expect("metric can be created");
    pub static ref CLASSIFIER_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "chirp_classifier_request_duration_seconds",
            "Emotion classifier call duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["status"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chirp_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("HTTP_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
            .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(ACTIONS_TOTAL.clone()))
            .expect("ACTIONS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(NOTIFICATIONS_TOTAL.clone()))
            .expect("NOTIFICATIONS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(USERS_TOTAL.clone()))
            .expect("USERS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(TWEETS_TOTAL.clone()))
            .expect("TWEETS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(CLASSIFIER_REQUESTS_TOTAL.clone()))
            .expect("CLASSIFIER_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(CLASSIFIER_REQUEST_DURATION_SECONDS.clone()))
            .expect("CLASSIFIER_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

/// Count a successful user action (`tweet`, `like`, `follow`, ...)
pub fn record_action(action: &str) {
    ACTIONS_TOTAL.with_label_values(&[action]).inc();
}
