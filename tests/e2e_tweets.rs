//! E2E tests for tweets, likes, comments, retweets and bookmarks

mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn test_create_and_get_tweet() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice").await;

    let tweet = server
        .post_tweet(&token, "Hello #Rust and #tokio world")
        .await;
    assert_eq!(tweet["author_username"], "alice");
    assert_eq!(tweet["like_count"], 0);
    assert_eq!(tweet["is_retweet"], false);
    assert_eq!(tweet["tags"], serde_json::json!(["rust", "tokio"]));

    let id = tweet["id"].as_str().unwrap();
    let fetched = server.get_json(&format!("/tweets/{}", id), None).await;
    assert_eq!(fetched["content"], "Hello #Rust and #tokio world");
}

#[tokio::test]
async fn test_create_tweet_requires_auth() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/tweets"))
        .json(&serde_json::json!({ "content": "anonymous" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_create_tweet_validates_content() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice").await;

    for content in ["   ".to_string(), "x".repeat(281)] {
        let response = server
            .client
            .post(server.url("/tweets"))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }
}

#[tokio::test]
async fn test_list_tweets_newest_first_with_pagination() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice").await;

    for i in 0..3 {
        server.post_tweet(&token, &format!("tweet {}", i)).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }

    let page = server.get_json("/tweets?limit=2", None).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["content"], "tweet 2");
    assert_eq!(page[1]["content"], "tweet 1");

    let last_id = page[1]["id"].as_str().unwrap();
    let next = server
        .get_json(&format!("/tweets?limit=2&max_id={}", last_id), None)
        .await;
    let next = next.as_array().unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0]["content"], "tweet 0");
}

#[tokio::test]
async fn test_like_twice_is_rejected() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    let tweet = server.post_tweet(&alice, "like me").await;
    let id = tweet["id"].as_str().unwrap();

    let response = server
        .client
        .post(server.url(&format!("/tweets/{}/like", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .post(server.url(&format!("/tweets/{}/like", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let fetched = server.get_json(&format!("/tweets/{}", id), None).await;
    assert_eq!(fetched["like_count"], 1);

    let status = server
        .get_json(&format!("/tweets/{}/like_status", id), Some(&bob))
        .await;
    assert_eq!(status["liked"], true);

    let response = server
        .client
        .delete(server.url(&format!("/tweets/{}/like", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let fetched = server.get_json(&format!("/tweets/{}", id), None).await;
    assert_eq!(fetched["like_count"], 0);
}

#[tokio::test]
async fn test_like_missing_tweet() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice").await;

    let response = server
        .client
        .post(server.url("/tweets/does-not-exist/like"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_comments() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    let tweet = server.post_tweet(&alice, "discuss").await;
    let id = tweet["id"].as_str().unwrap();

    let response = server
        .client
        .post(server.url("/comments"))
        .bearer_auth(&bob)
        .json(&serde_json::json!({ "tweet_id": id, "content": "nice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let comments = server
        .get_json(&format!("/tweets/{}/comments", id), None)
        .await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["author_username"], "bob");

    let fetched = server.get_json(&format!("/tweets/{}", id), None).await;
    assert_eq!(fetched["comment_count"], 1);
}

#[tokio::test]
async fn test_comment_on_missing_tweet() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice").await;

    let response = server
        .client
        .post(server.url("/comments"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "tweet_id": "does-not-exist", "content": "hello?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_retweet_once() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    let tweet = server.post_tweet(&alice, "spread the word").await;
    let id = tweet["id"].as_str().unwrap();

    let response = server
        .client
        .post(server.url(&format!("/tweets/{}/retweet", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let retweet: Value = response.json().await.unwrap();
    assert_eq!(retweet["is_retweet"], true);
    assert_eq!(retweet["original_tweet_id"], id);
    assert_eq!(retweet["original_author_username"], "alice");
    assert_eq!(retweet["content"], "spread the word");

    let response = server
        .client
        .post(server.url(&format!("/tweets/{}/retweet", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let fetched = server.get_json(&format!("/tweets/{}", id), None).await;
    assert_eq!(fetched["retweet_count"], 1);

    let retweeted = server
        .get_json("/users/bob/retweeted-tweets", None)
        .await;
    assert_eq!(retweeted.as_array().unwrap().len(), 1);

    let response = server
        .client
        .delete(server.url(&format!("/tweets/{}/retweet", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let fetched = server.get_json(&format!("/tweets/{}", id), None).await;
    assert_eq!(fetched["retweet_count"], 0);
}

#[tokio::test]
async fn test_only_author_can_delete() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;
    let bob = server.register_and_login("bob").await;

    let tweet = server.post_tweet(&alice, "mine").await;
    let id = tweet["id"].as_str().unwrap();

    let response = server
        .client
        .delete(server.url(&format!("/tweets/{}", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .delete(server.url(&format!("/tweets/{}", id)))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = server
        .client
        .get(server.url(&format!("/tweets/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_bookmarks() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;

    let tweet = server.post_tweet(&alice, "read later").await;
    let id = tweet["id"].as_str().unwrap();

    let response = server
        .client
        .post(server.url(&format!("/tweets/{}/bookmark", id)))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let bookmarks = server.get_json("/bookmarks", Some(&alice)).await;
    assert_eq!(bookmarks.as_array().unwrap().len(), 1);
    assert_eq!(bookmarks[0]["id"], id);
}

#[tokio::test]
async fn test_hashtag_tweets_and_trending() {
    let server = TestServer::new().await;
    let alice = server.register_and_login("alice").await;

    server.post_tweet(&alice, "#rust is fun").await;
    server.post_tweet(&alice, "more #Rust and #axum").await;

    let tagged = server.get_json("/hashtags/rust/tweets", None).await;
    assert_eq!(tagged.as_array().unwrap().len(), 2);

    let trending = server.get_json("/hashtags/trending", None).await;
    assert_eq!(trending[0]["name"], "rust");
    assert_eq!(trending[0]["usage_count"], 2);
    assert_eq!(trending[1]["name"], "axum");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice").await;

    let response = server
        .client
        .get(server.url("/tweets?max_id=does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    for path in [
        "/tweets/does-not-exist/like_status",
        "/tweets/does-not-exist/retweet_status",
    ] {
        let response = server
            .client
            .get(server.url(path))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404, "GET {}", path);
    }

    let response = server
        .client
        .get(server.url("/api/tweets/does-not-exist/reactions/summary"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
