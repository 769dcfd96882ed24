pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::*;
pub use handlers::ConsultationState;
pub use models::*;
pub use router::consultation_routes;
pub use services::*;
