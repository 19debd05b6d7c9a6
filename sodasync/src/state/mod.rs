pub mod store;
pub mod watermark;

pub use store::{CursorStore, MemoryCursorStore, PostgresCursorStore};
pub use watermark::WatermarkTracker;
