use serde::{Deserialize, Serialize};

pub mod health_check;
pub mod sync_runs;

/// JSON body returned for every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
}
