pub mod credentials;
pub mod destination;
pub mod error;
mod macros;
pub mod pipeline;
pub mod retry;
pub mod source;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
