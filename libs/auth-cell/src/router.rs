use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/callback", get(handlers::auth_callback))
        .route("/validate", get(handlers::validate_token))
        .route("/verify", get(handlers::verify_token))
        .with_state(state)
}
