use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers::*;
use doctor_cell::models::*;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn config_with(mock_server: &MockServer) -> Arc<AppConfig> {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    Arc::new(config)
}

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn doctor_row(doctor_id: Uuid, user_id: &str, specialization: &str) -> serde_json::Value {
    json!({
        "id": doctor_id,
        "user_id": user_id,
        "full_name": "Dr. Ayu Lestari",
        "specialization": specialization,
        "hourly_rate": 150000.0,
        "is_verified": true,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_register_doctor_success() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    let user = TestUser::doctor("dr.ayu@example.com");
    let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(24));
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .and(body_partial_json(json!({ "is_verified": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([doctor_row(
            doctor_id,
            &user.id,
            "Obstetrics"
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = register_doctor(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        Json(RegisterDoctorRequest {
            full_name: "Dr. Ayu Lestari".to_string(),
            specialization: "Obstetrics".to_string(),
            hourly_rate: 150000.0,
        }),
    )
    .await;

    assert!(result.is_ok(), "expected success, got {:?}", result.err());
    let response = result.unwrap().0;
    assert_eq!(response["is_verified"], true);
    assert_eq!(response["specialization"], "Obstetrics");
}

#[tokio::test]
async fn test_register_doctor_duplicate() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    let user = TestUser::doctor("dr.ayu@example.com");
    let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_row(
            Uuid::new_v4(),
            &user.id,
            "Obstetrics"
        )])))
        .mount(&mock_server)
        .await;

    let result = register_doctor(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        Json(RegisterDoctorRequest {
            full_name: "Dr. Ayu Lestari".to_string(),
            specialization: "Obstetrics".to_string(),
            hourly_rate: 150000.0,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn test_register_doctor_rejects_non_positive_rate() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);
    let user = TestUser::doctor("dr.ayu@example.com");
    let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(24));

    let result = register_doctor(
        State(config),
        create_auth_header(&token),
        Extension(user.to_user()),
        Json(RegisterDoctorRequest {
            full_name: "Dr. Ayu Lestari".to_string(),
            specialization: "Obstetrics".to_string(),
            hourly_rate: 0.0,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_list_doctors_with_filter() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("is_verified", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_row(
            Uuid::new_v4(),
            &Uuid::new_v4().to_string(),
            "Pediatrics"
        )])))
        .mount(&mock_server)
        .await;

    let result = list_doctors(
        State(config),
        Query(DoctorSearchQuery {
            specialization: Some("Pediatrics".to_string()),
            limit: Some(10),
            offset: None,
        }),
    )
    .await;

    assert!(result.is_ok(), "expected success, got {:?}", result.err());
    let response = result.unwrap().0;
    assert_eq!(response["total"], 1);
    assert!(response["doctors"].is_array());
}

#[tokio::test]
async fn test_get_doctor_not_found() {
    let mock_server = MockServer::start().await;
    let config = config_with(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = get_doctor(State(config), Path(Uuid::new_v4())).await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}
