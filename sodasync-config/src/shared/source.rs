use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SerializableSecretString;
use crate::shared::ValidationError;

/// Default number of records requested per page.
///
/// This is also the maximum page size most Socrata-style portals will serve.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default timeout for a single source API request, in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the paginated source API.
///
/// The source is expected to be a SODA-style endpoint returning a JSON array of
/// records and accepting `$where`, `$order`, `$limit` and `$offset` query
/// parameters.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Full URL of the dataset resource, e.g.
    /// `https://data.cityofchicago.org/resource/ijzp-q8t2.json`.
    pub endpoint: String,
    /// Application token sent as the `X-App-Token` header on every request.
    ///
    /// May be omitted when [`SourceConfig::allow_anonymous`] is true; anonymous
    /// requests are accepted by the portal but heavily throttled.
    pub app_token: Option<SerializableSecretString>,
    /// Allows running without an app token.
    #[serde(default)]
    pub allow_anonymous: bool,
    /// Number of records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Timeout for a single API request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SourceConfig {
    /// Validates the source configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.is_empty() {
            return Err(ValidationError::InvalidSource(
                "Source endpoint cannot be empty".to_string(),
            ));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidSource(
                "Source endpoint must start with http:// or https://".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ValidationError::InvalidSource(
                "Source page_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("endpoint", &self.endpoint)
            .field("app_token", &"REDACTED")
            .field("allow_anonymous", &self.allow_anonymous)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
