use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn profile_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/me", get(handlers::get_my_profile))
        .route("/", post(handlers::create_profile))
        .route("/me/onboarding", patch(handlers::complete_onboarding))
        .route("/{user_id}/role", patch(handlers::update_role))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
