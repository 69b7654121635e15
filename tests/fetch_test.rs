mod common;

use common::MockApi;
use serde_json::{Value, json};
use sporlapi::{
    Client, ClientConfig, Error, Failure,
    spotify::fetch::FetchRequest,
};

#[tokio::test]
async fn test_bearer_token_is_injected() {
    let api = MockApi::start().await;
    let client = Client::new("secret-token", api.config()).unwrap();

    let body = client.fetch(FetchRequest::get("/echo")).await.unwrap();

    assert_eq!(body["authorization"], "Bearer secret-token");
}

#[tokio::test]
async fn test_explicit_authorization_header_wins() {
    let api = MockApi::start().await;
    let client = Client::new("secret-token", api.config()).unwrap();

    let body = client
        .fetch(FetchRequest::get("/echo").header("Authorization", "Bearer override"))
        .await
        .unwrap();

    assert_eq!(body["authorization"], "Bearer override");
}

#[tokio::test]
async fn test_undefined_query_values_are_omitted() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let request = FetchRequest::get("/echo")
        .query("limit", 5)
        .query_opt::<u32>("offset", None);
    let body = client.fetch(request).await.unwrap();

    let query = body["query"].as_str().unwrap();
    assert!(query.contains("limit=5"));
    assert!(!query.contains("offset"));
}

#[tokio::test]
async fn test_body_is_sent_for_non_get() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let body = client
        .fetch(FetchRequest::put("/echo").body(json!({ "ids": ["a", "b"] })))
        .await
        .unwrap();

    assert_eq!(body["method"], "PUT");
    assert_eq!(body["body"], json!({ "ids": ["a", "b"] }));
    assert_eq!(body["content_type"], "application/json");
}

#[tokio::test]
async fn test_body_is_ignored_for_get() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let body = client
        .fetch(FetchRequest::get("/echo").body(json!({ "ignored": true })))
        .await
        .unwrap();

    assert_eq!(body["body"], Value::Null);
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let body = client.fetch(FetchRequest::get("/empty")).await.unwrap();

    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_rejected_token_is_invalid_credential() {
    let api = MockApi::start().await;
    let client = Client::new("expired", api.config()).unwrap();

    let err = client.fetch(FetchRequest::get("/echo")).await.unwrap_err();

    match err {
        Error::InvalidCredential { status, message, payload } => {
            assert_eq!(status, 401);
            assert_eq!(message, "The access token expired");
            assert_eq!(payload.unwrap()["error"]["status"], 401);
        }
        other => panic!("expected InvalidCredential, got {other:?}"),
    }
}

#[tokio::test]
async fn test_other_statuses_are_unexpected() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    for code in [400u16, 403, 404, 500, 502] {
        let err = client
            .fetch(FetchRequest::get(format!("/status/{code}")))
            .await
            .unwrap_err();

        assert!(!err.is_auth_error(), "{code} should not be an auth error");
        assert_eq!(err.status(), Some(code));
        assert!(err.payload().is_some());
    }
}

#[tokio::test]
async fn test_rate_limit_exposes_retry_after() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let err = client.fetch(FetchRequest::get("/status/429")).await.unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(err.retry_after(), Some(3));
    // Not retried by the core
    assert_eq!(api.count("/v1/status/429"), 1);
}

#[tokio::test]
async fn test_malformed_body_is_unexpected() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let err = client.fetch(FetchRequest::get("/garbage")).await.unwrap_err();

    assert!(matches!(err, Error::UnexpectedFailure(Failure::Decode(_))));
}

#[tokio::test]
async fn test_transport_failure_is_unexpected() {
    // Bind then drop a listener to get a port nobody serves
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        api_base_url: format!("http://{addr}/v1"),
        ..ClientConfig::default()
    };
    let client = Client::new("token", config).unwrap();

    let err = client.fetch(FetchRequest::get("/me")).await.unwrap_err();

    assert!(matches!(err, Error::UnexpectedFailure(Failure::Transport(_))));
}

#[tokio::test]
async fn test_adopted_token_is_used_by_next_fetch() {
    let api = MockApi::start().await;
    let client = Client::new("first", api.config()).unwrap();

    client.tokens().set_token("second").unwrap();
    let body = client.fetch(FetchRequest::get("/echo")).await.unwrap();

    assert_eq!(body["authorization"], "Bearer second");
}

#[tokio::test]
async fn test_concurrent_fetches_are_independent() {
    let api = MockApi::start().await;
    let client = Client::new("token", api.config()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .fetch(FetchRequest::get("/echo").query("n", i))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let body = handle.await.unwrap().unwrap();
        assert_eq!(body["query"], format!("n={i}"));
    }
    assert_eq!(api.count("/v1/echo"), 8);
}
