pub mod base;
pub mod memory;
pub mod postgres;

pub use base::CursorStore;
pub use memory::MemoryCursorStore;
pub use postgres::PostgresCursorStore;
