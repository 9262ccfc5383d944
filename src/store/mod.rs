pub mod branch_store;
pub mod timeline;

pub use branch_store::BranchStore;
pub use timeline::Timeline;
