use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use shared_utils::test_utils::{JwtTestUtils, MockRows, TestConfig, TestUser};

fn app(config: &TestConfig) -> Router {
    auth_routes(config.to_arc())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_token(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_register_without_password_is_bad_request() {
    let config = TestConfig::default();
    let body = json!({ "email": "jane@example.com", "name": "Jane Roe" });

    let response = app(&config).oneshot(post_json("/register", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let hash = auth_cell::services::PasswordService::hash_password("right").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user(50, "jane@example.com", "patient", &hash, true)
        ])))
        .mount(&mock_server)
        .await;

    let body = json!({ "email": "jane@example.com", "password": "wrong" });
    let response = app(&config).oneshot(post_json("/login", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_validate_returns_claims() {
    let config = TestConfig::default();
    let user = TestUser::doctor("doc@example.com", 3);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

    let response = app(&config).oneshot(with_token("POST", "/validate", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["user_id"], user.id.to_string());
    assert_eq!(json["role"], "doctor");
}

#[tokio::test]
async fn test_verify_reports_expired_token_as_invalid() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_expired_token(&TestUser::default(), &config.jwt_secret);

    let response = app(&config).oneshot(with_token("POST", "/verify", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valid"], false);
}

#[tokio::test]
async fn test_validate_rejects_bad_signature() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_invalid_signature_token(&TestUser::default());

    let response = app(&config).oneshot(with_token("POST", "/validate", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_account_and_profile() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let user = TestUser::patient("jane@example.com", 7);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user(user.id, "jane@example.com", "patient", "$argon2id$secret", true)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::patient(7, user.id, "Jane Roe")])))
        .mount(&mock_server)
        .await;

    let response = app(&config).oneshot(with_token("GET", "/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["profile"]["name"], "Jane Roe");
    assert_eq!(json["user"]["email"], "jane@example.com");
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_requires_token() {
    let config = TestConfig::default();
    let request = Request::builder().uri("/me").body(Body::empty()).unwrap();

    let response = app(&config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
