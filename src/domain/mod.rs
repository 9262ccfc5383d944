pub mod branch;
pub mod message;

pub use branch::{ActiveBranch, SavedBranch};
pub use message::{BranchHighlight, Message, MessageRole};
