//! Forum view de-duplication.

mod view_tracker;

pub use view_tracker::{RedisViewTracker, ViewTracker, VIEW_WINDOW_SECS};
