use serde::{Deserialize, Serialize};

use crate::shared::RetryConfig;

/// Configuration for a sync pipeline's identity and retry behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// The unique identifier for this pipeline.
    ///
    /// The pipeline id isolates the persisted sync cursor of one pipeline from
    /// another when several pipelines share a cursor store.
    pub id: u64,
    /// Retry policy for transient source fetch failures.
    #[serde(default)]
    pub fetch_retry: RetryConfig,
    /// Retry policy for transient destination write failures.
    #[serde(default)]
    pub load_retry: RetryConfig,
}
