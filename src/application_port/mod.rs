mod user_error;
mod user_service;

pub use user_error::*;
pub use user_service::*;
