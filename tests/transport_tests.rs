//! Tests for the undecorated passthrough surface and the raw transport.

use http::Method;
use restspeaker::{
    NoAuth, PendingResponse, RequestOptions, RestSpeaker, StaticAuth, Transport,
    DEFAULT_RAW_CONTENT_TYPE, DEFAULT_USER_AGENT,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authed_speaker(mock_server: &MockServer) -> RestSpeaker {
    let auth = StaticAuth::bearer("token123").unwrap();
    RestSpeaker::new(auth, mock_server.uri()).unwrap()
}

#[tokio::test]
async fn test_raw_transport_returns_unmodified_response() {
    let mock_server = MockServer::start().await;
    let body = json!({"decoded": "json", "hmm": ["nested", "array", 1, 2.0]}).to_string();

    Mock::given(method("GET"))
        .and(path("/raw"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.clone(), "application/json")
                .insert_header("x-custom-header", "custom-value"),
        )
        .mount(&mock_server)
        .await;

    let api = authed_speaker(&mock_server);
    let response = api.transport().get("/raw", RequestOptions::new()).await.unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.text(), body);
    assert_eq!(response.header("x-custom-header"), Some("custom-value"));
    assert!(api.last_response().is_none());
}

#[tokio::test]
async fn test_raw_requests_use_transport_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .and(header("content-type", DEFAULT_RAW_CONTENT_TYPE))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = Transport::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();
    transport.get("/", RequestOptions::new()).await.unwrap();
}

#[tokio::test]
async fn test_request_skips_auth_and_decoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/endpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"))
        .mount(&mock_server)
        .await;

    let api = authed_speaker(&mock_server);
    let response = api
        .request(Method::GET, "/endpoint", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.text(), r#"{"a":1}"#);
    assert!(api.last_response().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_ne!(
        requests[0].headers.get("accept").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_request_passes_options_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("authorization", "Bearer explicit"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = RestSpeaker::new(NoAuth::new(), mock_server.uri()).unwrap();
    let options = RequestOptions::new()
        .with_header("Authorization", "Bearer explicit")
        .unwrap()
        .with_query_param("page", "1");

    let response = api.request(Method::GET, "/users", options).await.unwrap();
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_request_works_with_all_methods() {
    let mock_server = MockServer::start().await;

    for verb in ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"] {
        Mock::given(method(verb))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let api = RestSpeaker::new(NoAuth::new(), mock_server.uri()).unwrap();
    for verb in ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"] {
        let method = Method::from_bytes(verb.as_bytes()).unwrap();
        let response = api
            .request(method, "/test", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(response.status.as_u16(), 200);
    }
}

#[tokio::test]
async fn test_request_async_returns_detached_future() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/queue"))
        .respond_with(ResponseTemplate::new(202).set_body_string(r#"{"queued":true}"#))
        .mount(&mock_server)
        .await;

    let api = RestSpeaker::new(NoAuth::new(), mock_server.uri()).unwrap();
    let pending: PendingResponse = api.request_async(Method::POST, "/queue", RequestOptions::new());

    // The future outlives the client that created it.
    drop(api);
    let response = pending.await.unwrap();

    assert_eq!(response.status.as_u16(), 202);
    assert_eq!(response.text(), r#"{"queued":true}"#);
}

#[tokio::test]
async fn test_request_async_json_sets_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/data"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"data":"value"}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = RestSpeaker::new(NoAuth::new(), mock_server.uri()).unwrap();
    let options = RequestOptions::new().with_json(&json!({"data": "value"})).unwrap();

    let response = tokio::spawn(api.request_async(Method::POST, "/data", options))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_verb_async_variants() {
    let mock_server = MockServer::start().await;

    for verb in ["GET", "HEAD", "DELETE", "PUT", "POST", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/async-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let transport = Transport::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let pending = vec![
        transport.get_async("/async-test", RequestOptions::new()),
        transport.head_async("/async-test", RequestOptions::new()),
        transport.delete_async("/async-test", RequestOptions::new()),
        transport.put_async("/async-test", RequestOptions::new()),
        transport.post_async("/async-test", RequestOptions::new()),
        transport.patch_async("/async-test", RequestOptions::new()),
    ];

    for future in pending {
        assert_eq!(future.await.unwrap().status.as_u16(), 200);
    }
}

#[tokio::test]
async fn test_send_dispatches_prebuilt_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"name":"test"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"success":true}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = authed_speaker(&mock_server);
    let request = reqwest::Client::new()
        .post(format!("{}/resources", mock_server.uri()))
        .header("Content-Type", "application/json")
        .body(r#"{"name":"test"}"#)
        .build()
        .unwrap();

    let response = api.send(request).await.unwrap();

    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.text(), r#"{"success":true}"#);
    assert!(api.last_response().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(requests[0].headers.get("user-agent").is_none());
}

#[tokio::test]
async fn test_send_async_with_full_uri() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"async":true}"#))
        .mount(&mock_server)
        .await;

    let api = RestSpeaker::new(NoAuth::new(), "").unwrap();
    let request = reqwest::Request::new(
        Method::GET,
        format!("{}/jobs", mock_server.uri()).parse().unwrap(),
    );

    let response = api.send_async(request).await.unwrap();
    assert_eq!(response.text(), r#"{"async":true}"#);
}

#[tokio::test]
async fn test_curl_logging_does_not_change_requests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("restspeaker=debug")
        .with_test_writer()
        .try_init();

    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/logged"))
        .and(body_string(r#"{"a":1}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = Transport::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .log_curl(true)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let options = RequestOptions::new().with_json(&json!({"a": 1})).unwrap();

    let response = transport.put("/logged", options).await.unwrap();
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(transport.config("log_curl"), Some(json!(true)));
}

#[tokio::test]
async fn test_injected_client_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(header("x-from-client", "yes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = http::HeaderMap::new();
    headers.insert("x-from-client", http::HeaderValue::from_static("yes"));
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap();

    let transport = Transport::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .with_client(client)
        .build()
        .unwrap();
    let mut api = RestSpeaker::with_transport(NoAuth::new(), transport);

    assert_eq!(api.get("/", RequestOptions::new()).await.unwrap(), None);
}

#[tokio::test]
async fn test_builder_timeout_applies_to_injected_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let transport = Transport::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .with_client(reqwest::Client::new())
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = transport.get("/slow", RequestOptions::new()).await;
    assert!(matches!(result, Err(restspeaker::Error::Timeout)));
}
