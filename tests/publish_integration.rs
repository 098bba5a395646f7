use serde_json::json;
use tagwatch::publish::HttpQueuePublisher;
use tagwatch_core::contract::MessagePublisher;
use tagwatch_core::events::{EventKind, ReleaseMessage};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message() -> ReleaseMessage {
    ReleaseMessage {
        id: 42,
        kind: EventKind::Release,
        repo_name: "owner/repo".into(),
        tag_name: "v1.2.3".into(),
        created_at: None,
    }
}

#[tokio::test]
async fn test_publish_posts_message_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queue"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "id": 42,
            "type": "ReleaseEvent",
            "repoName": "owner/repo",
            "tagName": "v1.2.3",
            "createdAt": null
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = HttpQueuePublisher::new(format!("{}/queue", server.uri())).unwrap();
    let result = publisher.publish(&message()).await;
    assert!(result.is_ok(), "publish failed: {:?}", result.err());
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    struct TestCase {
        name: &'static str,
        status: u16,
    }
    let test_cases = vec![
        TestCase { name: "server error", status: 500 },
        TestCase { name: "rejected", status: 403 },
    ];

    for tc in test_cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(tc.status))
            .mount(&server)
            .await;

        let publisher = HttpQueuePublisher::new(server.uri()).unwrap();
        let err = publisher.publish(&message()).await.expect_err(tc.name);
        assert!(
            err.to_string().contains(&tc.status.to_string()),
            "{}: {err}",
            tc.name
        );
    }
}

#[tokio::test]
async fn test_unreachable_queue_is_an_error() {
    let publisher = HttpQueuePublisher::new("http://127.0.0.1:9/queue").unwrap();
    assert!(publisher.publish(&message()).await.is_err());
}
