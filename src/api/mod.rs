//! API layer
//!
//! HTTP handlers for:
//! - Accounts, profiles and follows
//! - Tweets, likes, comments, retweets and bookmarks
//! - Notifications and hashtags
//! - Emotion detection and reactions
//! - Metrics (Prometheus)

mod converters;
mod dto;
mod emotion;
mod hashtags;
pub mod metrics;
mod notifications;
mod tweets;
mod users;

pub use converters::*;
pub use dto::*;

pub use metrics::metrics_router;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;

/// Create the JSON API router
///
/// Authentication is enforced per handler through the `CurrentUser`
/// extractor, so public and authenticated routes share one router.
pub fn api_router(state: &AppState) -> Router<AppState> {
    let users = Router::new()
        .route("/token", post(users::login))
        .route("/users", post(users::register))
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/:username", get(users::get_user))
        .route("/users/:username/tweets", get(users::user_tweets))
        .route("/users/:username/liked-tweets", get(users::liked_tweets))
        .route(
            "/users/:username/retweeted-tweets",
            get(users::retweeted_tweets),
        )
        .route("/users/:username/followers", get(users::followers))
        .route("/users/:username/following", get(users::following))
        .route("/users/:username/stats", get(users::stats))
        .route("/users/:username/follow_status", get(users::follow_status))
        .route(
            "/users/:username/follow",
            post(users::follow).delete(users::unfollow),
        )
        .route(
            "/users/:username/unfollow",
            axum::routing::delete(users::unfollow),
        );

    let tweets = Router::new()
        .route("/tweets", get(tweets::list_tweets).post(tweets::create_tweet))
        .route(
            "/tweets/:id",
            get(tweets::get_tweet).delete(tweets::delete_tweet),
        )
        .route("/tweets/:id/like", post(tweets::like).delete(tweets::unlike))
        .route("/tweets/:id/unlike", axum::routing::delete(tweets::unlike))
        .route("/tweets/:id/like_status", get(tweets::like_status))
        .route("/tweets/:id/likes", get(tweets::list_likes))
        .route("/tweets/:id/comments", get(tweets::list_comments))
        .route("/comments", post(tweets::create_comment))
        .route(
            "/tweets/:id/retweet",
            post(tweets::retweet).delete(tweets::unretweet),
        )
        .route(
            "/tweets/:id/unretweet",
            axum::routing::delete(tweets::unretweet),
        )
        .route("/tweets/:id/retweet_status", get(tweets::retweet_status))
        .route(
            "/tweets/:id/bookmark",
            post(tweets::bookmark).delete(tweets::unbookmark),
        )
        .route("/bookmarks", get(tweets::list_bookmarks));

    let notifications = Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/count", get(notifications::unread_count))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read));

    let hashtags = Router::new()
        .route("/hashtags/trending", get(hashtags::trending))
        .route("/hashtags/:tag/tweets", get(hashtags::tag_tweets));

    // Base64 images are larger than axum's default body limit
    let emotion = Router::new()
        .route("/api/emotion", post(emotion::detect))
        .route(
            "/api/tweets/:id/reactions",
            post(emotion::react)
                .get(emotion::list_reactions)
                .delete(emotion::delete_reaction),
        )
        .route(
            "/api/tweets/:id/reactions/summary",
            get(emotion::reaction_summary),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            state.config.emotion.max_image_bytes,
        ));

    Router::new()
        .merge(users)
        .merge(tweets)
        .merge(notifications)
        .merge(hashtags)
        .merge(emotion)
}
