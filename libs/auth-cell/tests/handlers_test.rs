use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::handlers::*;
use auth_cell::models::CallbackQuery;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn config_with(mock_server: &MockServer) -> Arc<AppConfig> {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    Arc::new(config)
}

fn callback_query(code: Option<&str>, next: Option<&str>) -> Query<CallbackQuery> {
    Query(CallbackQuery {
        code: code.map(str::to_string),
        register: None,
        next: next.map(str::to_string),
    })
}

fn redirect_location(redirect: axum::response::Redirect) -> String {
    let response = redirect.into_response();
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn mock_exchange(mock_server: &MockServer, user_id: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "pkce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "session-token",
            "token_type": "bearer",
            "user": { "id": user_id, "email": "siti@example.com" }
        })))
        .mount(mock_server)
        .await;
}

fn profile_row(role: &str, onboarding_completed: bool) -> serde_json::Value {
    json!({ "role": role, "onboarding_completed": onboarding_completed })
}

#[tokio::test]
async fn test_callback_without_code_redirects_to_login() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);

    let redirect = auth_callback(State(config), callback_query(None, None)).await;

    assert_eq!(
        redirect_location(redirect),
        "/login?error=auth_callback_failed"
    );
}

#[tokio::test]
async fn test_callback_exchange_failure_redirects_to_login() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&mock_server)
        .await;

    let redirect = auth_callback(State(config), callback_query(Some("bad-code"), None)).await;

    assert_eq!(
        redirect_location(redirect),
        "/login?error=auth_callback_failed"
    );
}

#[tokio::test]
async fn test_callback_missing_profile_creates_default_and_onboards() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    mock_exchange(&mock_server, "new-user").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .and(body_partial_json(json!({
            "id": "new-user",
            "role": "user",
            "onboarding_completed": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "new-user",
            "role": "user",
            "onboarding_completed": false
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let redirect = auth_callback(State(config), callback_query(Some("good-code"), None)).await;

    assert_eq!(redirect_location(redirect), "/onboarding");
}

#[tokio::test]
async fn test_callback_doctor_goes_to_doctor_dashboard() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    mock_exchange(&mock_server, "doc-user").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row("doctor", true)])))
        .mount(&mock_server)
        .await;

    let redirect = auth_callback(
        State(config),
        callback_query(Some("good-code"), Some("/consultations")),
    )
    .await;

    assert_eq!(redirect_location(redirect), "/doctor/dashboard");
}

#[tokio::test]
async fn test_callback_onboarded_user_honours_next() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    mock_exchange(&mock_server, "mum-user").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row("user", true)])))
        .mount(&mock_server)
        .await;

    let redirect = auth_callback(
        State(config),
        callback_query(Some("good-code"), Some("/consultations/42")),
    )
    .await;

    assert_eq!(redirect_location(redirect), "/consultations/42");
}

#[tokio::test]
async fn test_callback_rejects_offsite_next() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    mock_exchange(&mock_server, "mum-user").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row("user", true)])))
        .mount(&mock_server)
        .await;

    let redirect = auth_callback(
        State(config),
        callback_query(Some("good-code"), Some("https://evil.example")),
    )
    .await;

    assert_eq!(redirect_location(redirect), "/dashboard");
}

#[tokio::test]
async fn test_validate_token_returns_user_details() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    let user = TestUser::user("siti@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let result = validate_token(State(config), headers).await;

    assert!(result.is_ok(), "expected success, got {:?}", result.err());
    let response = result.unwrap().0;
    assert!(response.valid);
    assert_eq!(response.user_id, user.id);
    assert_eq!(response.role, Some("user".to_string()));
}

#[tokio::test]
async fn test_verify_token_reports_invalid_without_erroring() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);

    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        HeaderValue::from_static("Bearer not.a.token"),
    );

    let result = verify_token(State(config), headers).await;

    assert!(result.is_ok(), "expected success, got {:?}", result.err());
    assert_eq!(result.unwrap().0["valid"], false);
}
