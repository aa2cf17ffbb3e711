//! End-to-end client tests against a mocked backend.

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use libadmin::api::{ApiClient, ApiError};
use libadmin::config::{Config, HttpConfig};
use libadmin::models::Category;
use libadmin::resources::{DraftState, Flag, Resource};

fn test_config(uri: &str) -> Config {
    Config {
        api_url: uri.to_string(),
        http: HttpConfig {
            timeout_seconds: 5,
            user_agent: "libadmin-tests".to_string(),
            accept_invalid_certs: false,
        },
        log_file: "./libadmin.log".into(),
    }
}

#[tokio::test]
async fn view_round_trip_decodes_records() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Master/Category"))
        .and(body_partial_json(json!({ "flag": "VIEW" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "MESSAGE": "2 rows.",
            "category_Variables": [
                { "categoryID": 1, "categoryName": "Fiction", "status": "Active" },
                { "categoryID": 2, "categoryName": "Maps", "status": "Inactive" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server.uri())).unwrap();
    let body = Category::build_request(Flag::View, &DraftState::unset_for::<Category>()).unwrap();
    let payload = client.execute::<Category>(&body).await.unwrap();

    assert_eq!(payload.message.as_deref(), Some("2 rows."));
    assert_eq!(payload.records.len(), 2);
    assert_eq!(payload.records[0].id, Some(1));
    assert_eq!(payload.records[1].name, "Maps");
}

#[tokio::test]
async fn insert_posts_the_exact_body_and_returns_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Master/Category"))
        .and(body_json(json!({
            "flag": "INSERT",
            "categoryID": null,
            "categoryName": "Fiction",
            "status": "Active"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "MESSAGE": "Inserted successfully." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut draft = DraftState::for_resource::<Category>();
    draft.set("name", "Fiction");
    let body = Category::build_request(Flag::Insert, &draft).unwrap();

    let client = ApiClient::new(&test_config(&server.uri())).unwrap();
    let payload = client.execute::<Category>(&body).await.unwrap();

    assert_eq!(payload.message.as_deref(), Some("Inserted successfully."));
    assert!(payload.records.is_empty());
}

#[tokio::test]
async fn backend_error_carries_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Master/Category"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "Category name already exists" })),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server.uri())).unwrap();
    let body = Category::build_request(Flag::View, &DraftState::unset_for::<Category>()).unwrap();
    let err = client.execute::<Category>(&body).await.unwrap_err();

    match &err {
        ApiError::Backend { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "Category name already exists");
        }
        other => panic!("expected a backend error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Category name already exists");
    assert!(!err.is_local());
}

#[tokio::test]
async fn error_body_without_a_message_falls_back_to_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Master/Category"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server.uri())).unwrap();
    let body = Category::build_request(Flag::View, &DraftState::unset_for::<Category>()).unwrap();
    let err = client.execute::<Category>(&body).await.unwrap_err();

    assert_eq!(err.to_string(), "Request failed with status code 502");
}

#[tokio::test]
async fn malformed_success_body_is_an_unexpected_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Master/Category"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "category_Variables": "oops" })),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server.uri())).unwrap();
    let body = Category::build_request(Flag::View, &DraftState::unset_for::<Category>()).unwrap();
    let err = client.execute::<Category>(&body).await.unwrap_err();

    assert!(matches!(err, ApiError::UnexpectedFormat(_)));
    assert_eq!(err.to_string(), "Unexpected response format");
}
