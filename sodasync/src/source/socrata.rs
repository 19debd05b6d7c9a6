use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use sodasync_config::shared::SourceConfig;
use std::time::Duration;
use tracing::debug;

use crate::credentials::CredentialProvider;
use crate::error::SyncResult;
use crate::source::base::{PageQuery, PageSource};
use crate::types::Record;

/// Header carrying the Socrata application token.
const APP_TOKEN_HEADER: &str = "X-App-Token";

/// A SODA-style paginated HTTP source.
///
/// Issues `GET {endpoint}?$where=updated_on > '...'&$order=updated_on ASC
/// &$limit=N&$offset=M` requests and decodes the JSON array response into
/// [`Record`]s. The app token, when present, is attached to every request.
pub struct SocrataSource {
    client: reqwest::Client,
    endpoint: String,
    credentials: CredentialProvider,
}

impl SocrataSource {
    /// Creates a source for the configured endpoint.
    pub fn new(config: &SourceConfig, credentials: CredentialProvider) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            credentials,
        })
    }

    /// Builds the SODA query parameters for one page request.
    fn query_params(query: &PageQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("$order", "updated_on ASC".to_string()),
            ("$limit", query.limit.to_string()),
            ("$offset", query.offset.to_string()),
        ];

        if let Some(since) = query.since {
            params.push(("$where", format!("updated_on > '{since}'")));
        }

        params
    }
}

impl PageSource for SocrataSource {
    async fn fetch(&self, query: &PageQuery) -> SyncResult<Vec<Record>> {
        let params = Self::query_params(query);

        debug!(
            offset = query.offset,
            limit = query.limit,
            since = query.since.map(|w| w.to_string()),
            "fetching page from source API"
        );

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.credentials.token() {
            request = request.header(APP_TOKEN_HEADER, token.expose_secret());
        }

        let response = request.send().await?.error_for_status()?;
        let records = response.json::<Vec<Record>>().await?;

        Ok(records)
    }
}
