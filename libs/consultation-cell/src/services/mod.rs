pub mod consultation;
pub mod messages;
pub mod relay;

pub use consultation::ConsultationService;
pub use messages::MessageService;
pub use relay::{MessageRelay, Subscription};
