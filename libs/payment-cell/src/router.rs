use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Payment routes are unauthenticated by design: `/create` is called by the
/// checkout glue with explicit ids in the body, `/webhook` is authenticated
/// by its gateway signature alone.
pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/create", post(handlers::create_payment))
        .route("/webhook", post(handlers::payment_webhook))
        .with_state(state)
}
