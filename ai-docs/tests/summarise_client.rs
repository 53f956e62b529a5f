use ai_docs::summarise::{OpenAiClient, MAX_ERROR_BODY_CHARS};
use ai_docs_core::contract::{SummariseError, Summariser};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, key: Option<&str>, timeout: Duration) -> OpenAiClient {
    OpenAiClient::new(key.map(str::to_string), server.uri(), "gpt-test", timeout)
        .expect("client builds")
}

struct TestCase {
    name: &'static str,
    response: ResponseTemplate,
    check: fn(Result<String, SummariseError>),
}

#[tokio::test]
async fn maps_service_responses() {
    let cases = vec![
        TestCase {
            name: "success trims content",
            response: ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "  A utility library.\n"}}]
            })),
            check: |result| assert_eq!(result.unwrap(), "A utility library."),
        },
        TestCase {
            name: "server error",
            response: ResponseTemplate::new(500).set_body_string("upstream down"),
            check: |result| match result {
                Err(SummariseError::Status { status, body }) => {
                    assert_eq!(status, 500);
                    assert_eq!(body, "upstream down");
                }
                other => panic!("expected status error, got {other:?}"),
            },
        },
        TestCase {
            name: "long error body is truncated",
            response: ResponseTemplate::new(503).set_body_string("é".repeat(2_000)),
            check: |result| match result {
                Err(SummariseError::Status { status, body }) => {
                    assert_eq!(status, 503);
                    assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS);
                }
                other => panic!("expected status error, got {other:?}"),
            },
        },
        TestCase {
            name: "no choices",
            response: ResponseTemplate::new(200).set_body_json(json!({"choices": []})),
            check: |result| assert!(matches!(result, Err(SummariseError::Malformed(_)))),
        },
        TestCase {
            name: "empty content",
            response: ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "   "}}]
            })),
            check: |result| assert!(matches!(result, Err(SummariseError::Malformed(_)))),
        },
        TestCase {
            name: "not json",
            response: ResponseTemplate::new(200).set_body_string("<html>"),
            check: |result| assert!(matches!(result, Err(SummariseError::Malformed(_)))),
        },
    ];

    for case in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-test"})))
            .respond_with(case.response)
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-test"), Duration::from_secs(5));
        println!("case: {}", case.name);
        (case.check)(client.summarise("lodash", "# lodash").await);
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("sk-test"), Duration::from_millis(300));
    let result = client.summarise("slow", "# slow").await;
    assert!(
        matches!(result, Err(SummariseError::Timeout(_))),
        "expected timeout, got {result:?}"
    );
}

#[tokio::test]
async fn missing_credential_fails_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None, Duration::from_secs(5));
    let result = client.summarise("lodash", "# lodash").await;
    assert!(matches!(result, Err(SummariseError::MissingCredential)));
}
