pub mod highlight_utils;

pub use highlight_utils::{Segment, split_segments};
