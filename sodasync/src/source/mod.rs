pub mod base;
pub mod fetcher;
pub mod memory;
pub mod socrata;

pub use base::{PageQuery, PageSource};
pub use fetcher::PageFetcher;
