mod error;
mod handler;
mod router;

pub use error::*;
pub use handler::{ApiResponse, HealthResponse};
pub use router::routes;
