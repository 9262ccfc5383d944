pub mod api;
pub mod config;
pub mod domain;
pub mod session;
pub mod store;
pub mod stream;
pub mod utils;

pub use config::Settings;
pub use session::{SessionService, SessionState};
