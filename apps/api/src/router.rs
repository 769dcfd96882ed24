use std::sync::Arc;

use axum::{routing::get, Router};

use auth_cell::router::auth_routes;
use consultation_cell::handlers::ConsultationState;
use consultation_cell::router::consultation_routes;
use doctor_cell::router::doctor_routes;
use payment_cell::router::payment_routes;
use profile_cell::router::profile_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // The consultation cell carries the one piece of cross-request state,
    // the live message relay, inside its own router state.
    let consultation_state = ConsultationState::new(state.clone());

    Router::new()
        .route("/", get(|| async { "GENTING API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/profiles", profile_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/consultations", consultation_routes(consultation_state))
        .nest("/api/payment", payment_routes(state))
}
