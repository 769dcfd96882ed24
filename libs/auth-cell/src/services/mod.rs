pub mod callback;
pub mod redirect;

pub use callback::CallbackService;
pub use redirect::{decide_redirect, sanitize_next};
