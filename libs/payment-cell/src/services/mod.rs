pub mod gateway;
pub mod orchestrator;
pub mod signature;

pub use gateway::MidtransClient;
pub use orchestrator::PaymentService;
