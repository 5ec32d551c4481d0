// HTTP recommendation client tests against a mock engine

use std::time::Duration;

use mockito::Matcher;
use smart_match::core::{FeedbackSink, RecommendationSource};
use smart_match::models::{Decision, FeedbackEvent, IntentScope};
use smart_match::services::{RecommendationClient, RecommendationError};

fn client(base_url: String, max_retries: u32) -> RecommendationClient {
    RecommendationClient::new(
        base_url,
        "test-key".to_string(),
        Duration::from_secs(5),
        max_retries,
        Duration::from_millis(1),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_preserves_ranking_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/recommendations")
        .match_header("x-api-key", "test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "user_id": "me",
            "recommendation_type": "friends",
            "limit": 20,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "recommendations": [
                    {"user_id": "c3", "compatibility_score": 0.91, "common_interests": ["music"], "explanation": "Both in the band"},
                    {"user_id": "c1", "compatibility_score": 0.72, "common_interests": [], "explanation": "Same hostel"},
                    {"user_id": "me", "compatibility_score": 1.0, "common_interests": [], "explanation": "self"},
                    {"compatibility_score": 0.5}
                ],
                "total": 4
            }"#,
        )
        .create_async()
        .await;

    let candidates = client(server.url(), 0)
        .get_recommendations("me", IntentScope::Friends, 20)
        .await
        .unwrap();

    mock.assert_async().await;
    let ids: Vec<&str> = candidates.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(ids, vec!["c3", "c1"]);
    assert_eq!(candidates[0].common_interests, vec!["music".to_string()]);
    assert_eq!(candidates[1].explanation, "Same hostel");
}

#[tokio::test]
async fn test_fetch_skips_out_of_range_scores() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/recommendations")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "recommendations": [
                    {"user_id": "over", "compatibility_score": 1.7, "common_interests": [], "explanation": ""},
                    {"user_id": "under", "compatibility_score": -0.2, "common_interests": [], "explanation": ""},
                    {"user_id": "edge", "compatibility_score": 1.0, "common_interests": [], "explanation": ""},
                    {"user_id": "zero", "compatibility_score": 0.0, "common_interests": [], "explanation": ""}
                ]
            }"#,
        )
        .create_async()
        .await;

    let candidates = client(server.url(), 0)
        .get_recommendations("me", IntentScope::Dating, 10)
        .await
        .unwrap();

    let ids: Vec<&str> = candidates.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(ids, vec!["edge", "zero"]);
}

#[tokio::test]
async fn test_fetch_server_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/recommendations")
        .with_status(500)
        .create_async()
        .await;

    let err = client(server.url(), 0)
        .get_recommendations("me", IntentScope::Study, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::ApiError(_)));
}

#[tokio::test]
async fn test_fetch_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/recommendations")
        .with_status(401)
        .create_async()
        .await;

    let err = client(server.url(), 0)
        .get_recommendations("me", IntentScope::Friends, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::Unauthorized));
}

#[tokio::test]
async fn test_feedback_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/feedback")
        .match_header("x-api-key", "test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "user_id": "alice",
            "recommended_user_id": "bob",
            "feedback_type": "like",
        })))
        .with_status(200)
        .create_async()
        .await;

    let event = FeedbackEvent::new("alice", "bob", Decision::Like);
    client(server.url(), 0).submit_feedback(&event).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_feedback_retries_transient_failures() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/feedback")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let event = FeedbackEvent::new("alice", "bob", Decision::Pass);
    let err = client(server.url(), 2).submit_feedback(&event).await.unwrap_err();

    assert!(matches!(err, RecommendationError::ApiError(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_feedback_rejection_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/feedback")
        .with_status(422)
        .expect(1)
        .create_async()
        .await;

    let event = FeedbackEvent::new("alice", "bob", Decision::Pass);
    let err = client(server.url(), 3).submit_feedback(&event).await.unwrap_err();

    assert!(matches!(err, RecommendationError::InvalidResponse(_)));
    mock.assert_async().await;
}
