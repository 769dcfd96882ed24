use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::models::{CallbackQuery, ProfileState};
use crate::services::{decide_redirect, CallbackService};

const CALLBACK_FAILED: &str = "/login?error=auth_callback_failed";

/// Landing point for the hosted-auth redirect. Never returns an error
/// response: every failure before the profile lookup bounces back to the
/// login page with an error flag.
#[axum::debug_handler]
pub async fn auth_callback(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let Some(code) = query.code.as_deref() else {
        warn!("Auth callback hit without a code");
        return Redirect::to(CALLBACK_FAILED);
    };

    let service = CallbackService::new(&state);

    let session = match service.exchange_code(code).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Auth code exchange failed: {}", e);
            return Redirect::to(CALLBACK_FAILED);
        }
    };

    debug!(
        "Auth callback for user {} (register: {:?})",
        session.user.id, query.register
    );

    let profile = match service
        .profile_state(&session.user.id, &session.access_token)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            // Can't tell whether the row exists; onboarding re-checks.
            warn!("Profile lookup failed for {}: {}", session.user.id, e);
            ProfileState::Missing
        }
    };

    if profile == ProfileState::Missing {
        service
            .create_default_profile(&session.user.id, &session.access_token)
            .await;
    }

    let target = decide_redirect(&profile, query.next.as_deref());
    Redirect::to(&target)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_value = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    Ok(token.to_string())
}

#[axum::debug_handler]
pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let user = jwt::validate_token(&token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

#[axum::debug_handler]
pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let valid = jwt::validate_token(&token, &config.supabase_jwt_secret).is_ok();
    Ok(Json(json!({ "valid": valid })))
}
