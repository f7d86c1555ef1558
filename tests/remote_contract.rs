//! Contract tests for the remote assistant client against a mock endpoint.
//!
//! Every failure kind the controller distinguishes is produced here from
//! real HTTP traffic: bad credentials, throttling, server failures,
//! payloads with no reply, timeouts, and a dead endpoint.

use habla::config::{ApiKeyRef, RemoteConfig};
use habla::remote::{CompletionPort, RemoteAssistantClient, RemoteError};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config_for(server: &MockServer) -> RemoteConfig {
    RemoteConfig {
        api_url: server.uri(),
        api_key: ApiKeyRef::Literal {
            value: "sk-test".to_owned(),
        },
        request_timeout_secs: 2,
        ..RemoteConfig::default()
    }
}

#[tokio::test]
async fn success_sends_single_user_message_and_extracts_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "cuál es la capital de francia" }],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "París." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    let reply = client
        .complete("cuál es la capital de francia")
        .await
        .expect("completion");
    assert_eq!(reply, "París.");
}

#[tokio::test]
async fn request_carries_temperature_and_token_bound() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "max_tokens": 256,
        })))
        .and(|request: &Request| {
            let body: serde_json::Value =
                serde_json::from_slice(&request.body).expect("json body");
            body.get("temperature").is_some_and(serde_json::Value::is_number)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "vale" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    client.complete("hola").await.expect("completion");
}

#[tokio::test]
async fn missing_key_sends_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(|request: &Request| !request.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "anónimo" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = RemoteConfig {
        api_key: ApiKeyRef::None,
        ..config_for(&server)
    };
    let client = RemoteAssistantClient::new(&config).expect("client");
    client.complete("hola").await.expect("completion");
}

#[tokio::test]
async fn unauthorized_maps_to_auth_failure_with_provider_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    match client.complete("hola").await {
        Err(RemoteError::Unauthorized(detail)) => {
            assert!(detail.contains("Incorrect API key"));
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "message": "Rate limit reached" }
        })))
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    assert!(matches!(
        client.complete("hola").await,
        Err(RemoteError::RateLimited(_))
    ));
}

#[tokio::test]
async fn server_error_maps_to_other_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    match client.complete("hola").await {
        Err(RemoteError::Other(detail)) => {
            assert!(detail.contains("HTTP 500"));
            assert!(detail.contains("upstream exploded"));
        }
        other => panic!("expected Other, got {other:?}"),
    }
}

#[tokio::test]
async fn reply_without_content_is_malformed_not_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant" } }]
        })))
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    assert!(matches!(
        client.complete("hola").await,
        Err(RemoteError::Malformed(_))
    ));
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = RemoteAssistantClient::new(&config_for(&server)).expect("client");
    assert!(matches!(
        client.complete("hola").await,
        Err(RemoteError::Malformed(_))
    ));
}

#[tokio::test]
async fn elapsed_timeout_surfaces_as_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(10))
                .set_body_json(serde_json::json!({
                    "choices": [{ "message": { "content": "demasiado tarde" } }]
                })),
        )
        .mount(&server)
        .await;

    let config = RemoteConfig {
        request_timeout_secs: 1,
        ..config_for(&server)
    };
    let client = RemoteAssistantClient::new(&config).expect("client");
    match client.complete("hola").await {
        Err(RemoteError::Network(detail)) => assert!(detail.contains("timed out")),
        other => panic!("expected Network, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_surfaces_as_network_failure() {
    let config = RemoteConfig {
        api_url: "http://127.0.0.1:9".to_owned(),
        api_key: ApiKeyRef::None,
        request_timeout_secs: 2,
        ..RemoteConfig::default()
    };
    let client = RemoteAssistantClient::new(&config).expect("client");
    assert!(matches!(
        client.complete("hola").await,
        Err(RemoteError::Network(_))
    ));
}
