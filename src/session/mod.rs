pub mod service;
pub mod state;

pub use service::SessionService;
pub use state::SessionState;
