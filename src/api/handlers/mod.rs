pub mod branch;
pub mod message;
pub mod session;

pub use branch::*;
pub use message::*;
pub use session::*;
