//! HTTP client tests against a mock backend
//!
//! Exercise the production client's wire parsing, retry behavior and
//! bearer token handling with wiremock.

use inbox_triage::client::{HttpTriageClient, LoginRequest, TriageApi};
use inbox_triage::error::TriageError;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpTriageClient {
    let base = Url::parse(&server.uri()).expect("mock server uri");
    HttpTriageClient::new(base, Duration::from_secs(5), 4, 3).expect("client")
}

#[tokio::test]
async fn classify_inbox_sends_identifiers_and_parses_records() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(serde_json::json!({
            "user_no": 11,
            "email_id": "mina@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [
                {"index": 1, "date": "2023-06-14", "subject": "안부", "sender": "a@b.c", "body": "", "pred": "개인"},
                {"index": 2, "date": "2023-06-14", "subject": "세일", "sender": "s@b.c", "body": "", "pred": "광고"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client.classify_inbox(11, "mina@example.com").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].pred, "개인");
    assert_eq!(records[1].index, 2);
}

#[tokio::test]
async fn email_counts_parse_the_misspelled_wrapper() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success_message": "ok",
            "Ressult": [
                {"email_address": "mina@example.com", "emailCount": 312}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let counts = client.email_counts(11).await.unwrap();

    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].email_address, "mina@example.com");
    assert_eq!(counts[0].email_count, 312);
}

#[tokio::test]
async fn delete_usage_empty_body_means_first_use() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/delete/num/11"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let usage = client.delete_usage(11).await.unwrap();
    assert!(usage.is_none());
}

#[tokio::test]
async fn delete_usage_record_parses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/delete/num/11"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"deleteCount": 44})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let usage = client.delete_usage(11).await.unwrap();
    assert_eq!(usage.unwrap().delete_count, 44);
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let server = MockServer::start().await;

    // First two attempts fail with 503; the third succeeds.
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client.classify_inbox(11, "mina@example.com").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn permanent_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad email id"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.classify_inbox(11, "").await;
    assert!(matches!(result, Err(TriageError::BadRequest(_))));
}

#[tokio::test]
async fn login_stores_the_bearer_token_for_later_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": {"no": 11, "id": "mina", "name": "Mina", "isConnectionEmail": true},
            "accesstoken": "tok-777"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/count"))
        .and(header("authorization", "Bearer tok-777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Ressult": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let auth = client
        .login(&LoginRequest {
            id: "mina".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(auth.user.no, 11);
    assert!(auth.user.is_connection_email);

    // The count call only matches with the token attached.
    let counts = client.email_counts(11).await.unwrap();
    assert!(counts.is_empty());
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/count"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.email_counts(11).await;
    assert!(matches!(result, Err(TriageError::Auth(_))));
}
