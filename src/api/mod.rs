pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use error::ApiError;
pub use routes::{SharedSession, create_router};
