use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{DoctorSearchQuery, RegisterDoctorRequest};
use crate::services::doctor::DoctorService;

#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Doctor registration request from user: {}", user.id);

    let service = DoctorService::new(&state);
    let doctor = service
        .register(&user.id, request, auth.token())
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.contains("already exists") {
                AppError::Conflict(message)
            } else if message.contains("hourly_rate") {
                AppError::ValidationError(message)
            } else {
                AppError::Internal("Failed to register doctor".to_string())
            }
        })?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);
    let doctors = service
        .list(query)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);
    let doctor = service
        .get(doctor_id)
        .await
        .map_err(|_| AppError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(json!(doctor)))
}
