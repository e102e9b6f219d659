//! HttpProfileSource tests against a local mock server.

#![cfg(feature = "http")]

use std::time::Duration;

use profile_store::{
    FetchError, HttpProfileSource, LoadOutcome, ProfileSource, ProfileStore, RawProfile,
    SourceConfig, ViewState, PLACEHOLDER_IMAGE_URL,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn users_body() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": { "city": "Gwenborough" }
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "username": "Antonette",
            "email": "Shanna@melissa.tv"
        }
    ])
}

async fn server_answering(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn decodes_user_listing() {
    let server = server_answering(ResponseTemplate::new(200).set_body_json(users_body())).await;
    let source = HttpProfileSource::new(server.uri());

    let records = source.fetch_all().await.expect("listing should decode");

    assert_eq!(
        records,
        vec![
            RawProfile::new(1, "Leanne Graham").with_email("Sincere@april.biz"),
            RawProfile::new(2, "Ervin Howell").with_email("Shanna@melissa.tv"),
        ]
    );
}

#[tokio::test]
async fn non_success_status_carries_body() {
    let server =
        server_answering(ResponseTemplate::new(503).set_body_string("maintenance")).await;
    let source = HttpProfileSource::new(server.uri());

    let err = source.fetch_all().await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Status {
            status: 503,
            body: "maintenance".into()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = server_answering(
        ResponseTemplate::new(200).set_body_string(r#"{"users": "not a list"}"#),
    )
    .await;
    let source = HttpProfileSource::new(server.uri());

    let err = source.fetch_all().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Port 1 on loopback is reserved and refuses connections.
    let source = HttpProfileSource::new("http://127.0.0.1:1");

    let err = source.fetch_all().await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn slow_response_hits_request_timeout() {
    let server = server_answering(
        ResponseTemplate::new(200)
            .set_body_json(users_body())
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    let mut config = SourceConfig::new(server.uri());
    config.request_timeout_ms = Some(100);
    let source = HttpProfileSource::from_config(&config).unwrap();

    assert_eq!(source.fetch_all().await.unwrap_err(), FetchError::Timeout);
}

#[tokio::test]
async fn custom_users_path_is_requested() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = SourceConfig::new(format!("{}/api/v2/", server.uri()));
    config.users_path = "people".into();
    let source = HttpProfileSource::from_config(&config).unwrap();

    assert_eq!(source.fetch_all().await.unwrap(), vec![]);
}

// ============================================================================
// Store over HTTP
// ============================================================================

#[tokio::test]
async fn store_loads_and_maps_http_records() {
    let server = server_answering(ResponseTemplate::new(200).set_body_json(users_body())).await;
    let store = ProfileStore::new(HttpProfileSource::new(server.uri()));

    assert_eq!(store.load().outcome().await, LoadOutcome::Loaded(2));

    let leanne = store.get_by_id(1).unwrap();
    assert_eq!(leanne.name, "Leanne Graham");
    assert_eq!(leanne.age, 21);
    assert_eq!(leanne.image_url, PLACEHOLDER_IMAGE_URL);
}

#[tokio::test]
async fn store_reports_server_errors() {
    let server = server_answering(ResponseTemplate::new(500)).await;
    let store = ProfileStore::new(HttpProfileSource::new(server.uri()));

    store.load().outcome().await;

    assert_eq!(
        store.state(),
        ViewState::Error("Failed to load profiles: HTTP 500".into())
    );
}
