use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ConsultationState};

pub fn consultation_routes(state: ConsultationState) -> Router {
    Router::new()
        .route("/", post(handlers::book_consultation).get(handlers::list_consultations))
        .route("/{consultation_id}", get(handlers::get_consultation))
        .route("/{consultation_id}/status", patch(handlers::update_consultation_status))
        .route(
            "/{consultation_id}/messages",
            get(handlers::get_messages).post(handlers::send_message),
        )
        .route("/{consultation_id}/messages/live", get(handlers::live_messages))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
