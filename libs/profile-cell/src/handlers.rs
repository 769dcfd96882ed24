use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateProfileRequest, OnboardingRequest, UpdateRoleRequest};
use crate::services::ProfileService;

#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ProfileService::new(&state);
    let profile = service
        .get(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn create_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Creating profile for user: {}", user.id);

    let service = ProfileService::new(&state);

    if let Some(existing) = service
        .get(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    {
        return Ok(Json(json!(existing)));
    }

    let profile = service
        .create_default(&user.id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn complete_onboarding(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Completing onboarding for user: {}", user.id);

    let service = ProfileService::new(&state);
    let profile = service
        .complete_onboarding(&user.id, request, auth.token())
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                AppError::NotFound("Profile not found".to_string())
            } else {
                AppError::Internal(e.to_string())
            }
        })?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_role(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("admin") {
        return Err(AppError::Forbidden(
            "Only admins can assign roles".to_string(),
        ));
    }

    info!(
        "Admin {} setting role {} for user {}",
        user.id,
        request.role.as_str(),
        user_id
    );

    let service = ProfileService::new(&state);
    let profile = service
        .set_role(&user_id, request.role, auth.token())
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                AppError::NotFound("Profile not found".to_string())
            } else {
                AppError::Internal(e.to_string())
            }
        })?;

    Ok(Json(json!(profile)))
}
