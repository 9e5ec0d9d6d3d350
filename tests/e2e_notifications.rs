//! E2E tests for notifications

mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn test_mention_notifies_each_user_once() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    server
        .post_tweet(&alice, "hey @bob and @BOB, also @ghost and @alice")
        .await;

    let notifications = server.get_json("/notifications", Some(&bob)).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "mention");
    assert_eq!(notifications[0]["sender_username"], "alice");
    assert_eq!(notifications[0]["read"], false);

    // No self-notification
    let own = server.get_json("/notifications", Some(&alice)).await;
    assert!(own.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_like_comment_retweet_follow_notify_author() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    let tweet = server.post_tweet(&alice, "notify me").await;
    let id = tweet["id"].as_str().unwrap();

    for path in [
        format!("/tweets/{}/like", id),
        format!("/tweets/{}/retweet", id),
        "/users/alice/follow".to_string(),
    ] {
        let response = server
            .client
            .post(server.url(&path))
            .bearer_auth(&bob)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "POST {}", path);
    }

    let response = server
        .client
        .post(server.url("/comments"))
        .bearer_auth(&bob)
        .json(&serde_json::json!({ "tweet_id": id, "content": "great tweet" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let notifications = server.get_json("/notifications", Some(&alice)).await;
    let mut kinds: Vec<String> = notifications
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["type"].as_str().unwrap().to_string())
        .collect();
    kinds.sort();
    assert_eq!(kinds, vec!["comment", "follow", "like", "retweet"]);

    let comment = notifications
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["type"] == "comment")
        .unwrap();
    assert_eq!(comment["tweet_id"], id);
    assert_eq!(comment["comment_content"], "great tweet");
}

#[tokio::test]
async fn test_self_like_does_not_notify() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;

    let tweet = server.post_tweet(&alice, "self love").await;
    let id = tweet["id"].as_str().unwrap();

    let response = server
        .client
        .post(server.url(&format!("/tweets/{}/like", id)))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let count = server.get_json("/notifications/count", Some(&alice)).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_mark_read() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    server.post_tweet(&bob, "hi @alice").await;
    server.post_tweet(&bob, "hi again @alice").await;

    let count = server.get_json("/notifications/count", Some(&alice)).await;
    assert_eq!(count["count"], 2);

    let notifications = server.get_json("/notifications", Some(&alice)).await;
    let first_id = notifications[0]["id"].as_str().unwrap();

    // Someone else's notification is not found
    let response = server
        .client
        .put(server.url(&format!("/notifications/{}/read", first_id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .put(server.url(&format!("/notifications/{}/read", first_id)))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let unread = server
        .get_json("/notifications?unread_only=true", Some(&alice))
        .await;
    assert_eq!(unread.as_array().unwrap().len(), 1);

    let response = server
        .client
        .put(server.url("/notifications/read-all"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["updated"], 1);

    let count = server.get_json("/notifications/count", Some(&alice)).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/notifications"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
