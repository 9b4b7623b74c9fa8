//! Integration tests for webhook publishing against a mock chat endpoint.

use std::time::Duration;

use commitcast::error::PublishError;
use commitcast::publish::{CHAR_LIMIT, PublishOutcome, WebhookPublisher};
use commitcast::runlog::MemoryRunLog;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn publisher(server: &MockServer) -> WebhookPublisher {
    WebhookPublisher::new(format!("{}/hook", server.uri())).with_chunk_delay(Duration::ZERO)
}

/// Three lines that each need their own chunk.
fn three_part_message() -> String {
    ["a".repeat(1500), "b".repeat(1500), "c".repeat(1500)].join("\n")
}

// =============================================================================
// SUCCESSFUL DELIVERY
// =============================================================================

#[tokio::test]
async fn test_short_message_posted_once_without_suffix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(json!({ "content": "Weekly update: shipped things." })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let log = MemoryRunLog::new();
    let outcome = publisher(&server)
        .publish("Weekly update: shipped things.", &log)
        .await;

    assert!(matches!(outcome, PublishOutcome::Delivered { chunks: 1 }));
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_long_message_sent_in_numbered_parts() {
    let server = MockServer::start().await;
    for part in 1..=3 {
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_string_contains(format!("(Part {}/3)", part)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let log = MemoryRunLog::new();
    let outcome = publisher(&server).publish(&three_part_message(), &log).await;

    assert!(matches!(outcome, PublishOutcome::Delivered { chunks: 3 }));
    assert!(log.find("Message Splitting (Into 3 Chunks)").is_some());
    assert!(log.find("Sending Chunk 3/3 to Webhook").is_some());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for (i, request) in requests.iter().enumerate() {
        let body: serde_json::Value = request.body_json().unwrap();
        let content = body["content"].as_str().unwrap();
        assert!(content.chars().count() <= CHAR_LIMIT);
        assert!(content.ends_with(&format!(" (Part {}/3)", i + 1)));
    }
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn test_failure_mid_message_abandons_remaining_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("(Part 1/3)"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("(Part 2/3)"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("(Part 3/3)"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let log = MemoryRunLog::new();
    let outcome = publisher(&server).publish(&three_part_message(), &log).await;

    match outcome {
        PublishOutcome::Partial { sent, total, error } => {
            assert_eq!(sent, 1);
            assert_eq!(total, 3);
            match error {
                PublishError::Status { status, body } => {
                    assert_eq!(status, 500);
                    assert_eq!(body, "upstream down");
                }
                other => panic!("expected status error, got {:?}", other),
            }
        }
        other => panic!("expected partial delivery, got {:?}", other),
    }
    assert!(log.find("Error Sending Chunk 2/3 to Webhook").is_some());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_partial_with_nothing_sent() {
    let log = MemoryRunLog::new();
    let outcome = WebhookPublisher::new("http://127.0.0.1:1/hook")
        .publish("hello", &log)
        .await;

    assert!(matches!(
        outcome,
        PublishOutcome::Partial {
            sent: 0,
            total: 1,
            error: PublishError::Transport(_)
        }
    ));
}

// =============================================================================
// EMPTY INPUT
// =============================================================================

#[tokio::test]
async fn test_whitespace_message_posts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let log = MemoryRunLog::new();
    let outcome = publisher(&server).publish("  \n\t \n", &log).await;

    assert!(matches!(outcome, PublishOutcome::Empty));
    assert!(!outcome.is_complete());
    assert!(log.find("Webhook Sending Skipped").is_some());
}
