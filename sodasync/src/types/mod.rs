mod record;
mod run;
mod watermark;

pub use record::*;
pub use run::*;
pub use watermark::*;

/// Unique identifier for a sync pipeline instance.
///
/// [`PipelineId`] distinguishes pipelines that share a cursor store and is used
/// for logging and cursor isolation.
pub type PipelineId = u64;
