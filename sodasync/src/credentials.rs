use secrecy::{ExposeSecret, Secret};
use sodasync_config::shared::SourceConfig;
use std::fmt;
use tracing::info;

use crate::bail;
use crate::error::{ErrorKind, SyncError, SyncResult};

/// Environment variable consulted for the app token before the configured
/// secret.
const APP_TOKEN_ENV: &str = "SODA_APP_TOKEN";

/// Resolves the source API app token for one pipeline run.
///
/// A provider is constructed once per run and passed to the fetcher by
/// reference; there is deliberately no process-wide token cache, so rotating
/// the secret takes effect on the next invocation.
#[derive(Clone)]
pub struct CredentialProvider {
    token: Option<Secret<String>>,
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("token", &self.token.as_ref().map(|_| "REDACTED"))
            .finish()
    }
}

impl CredentialProvider {
    /// Resolves credentials from the environment and the source configuration.
    ///
    /// Resolution order: the `SODA_APP_TOKEN` environment variable, then the
    /// configured `app_token` secret. A missing token is fatal unless the
    /// source explicitly allows anonymous (throttled) access.
    pub fn resolve(config: &SourceConfig) -> SyncResult<Self> {
        let env_token = std::env::var(APP_TOKEN_ENV).ok();

        Self::resolve_from(config, env_token)
    }

    fn resolve_from(config: &SourceConfig, env_token: Option<String>) -> SyncResult<Self> {
        if let Some(token) = env_token {
            info!("resolved app token from the {} environment variable", APP_TOKEN_ENV);

            return Ok(Self {
                token: Some(Secret::new(token)),
            });
        }

        if let Some(token) = &config.app_token {
            info!("resolved app token from configuration");

            return Ok(Self {
                token: Some(Secret::new(token.expose_secret().clone())),
            });
        }

        if config.allow_anonymous {
            info!("no app token configured, running anonymously");

            return Ok(Self { token: None });
        }

        bail!(
            ErrorKind::CredentialMissing,
            "No app token available",
            format!(
                "set the {APP_TOKEN_ENV} environment variable, configure source.app_token, \
                 or enable source.allow_anonymous"
            )
        );
    }

    /// Returns the resolved token, if any.
    pub fn token(&self) -> Option<&Secret<String>> {
        self.token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sodasync_config::SerializableSecretString;

    fn source_config(app_token: Option<&str>, allow_anonymous: bool) -> SourceConfig {
        SourceConfig {
            endpoint: "https://example.com/resource/abcd-1234.json".to_string(),
            app_token: app_token.map(|t| SerializableSecretString::from(t.to_string())),
            allow_anonymous,
            page_size: 1000,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn environment_token_wins_over_config() {
        let config = source_config(Some("from-config"), false);
        let provider =
            CredentialProvider::resolve_from(&config, Some("from-env".to_string())).unwrap();
        assert_eq!(provider.token().unwrap().expose_secret(), "from-env");
    }

    #[test]
    fn falls_back_to_configured_token() {
        let config = source_config(Some("from-config"), false);
        let provider = CredentialProvider::resolve_from(&config, None).unwrap();
        assert_eq!(provider.token().unwrap().expose_secret(), "from-config");
    }

    #[test]
    fn anonymous_access_requires_opt_in() {
        let config = source_config(None, false);
        let err = CredentialProvider::resolve_from(&config, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialMissing);
    }

    #[test]
    fn anonymous_access_when_allowed() {
        let config = source_config(None, true);
        let provider = CredentialProvider::resolve_from(&config, None).unwrap();
        assert!(provider.token().is_none());
    }

    #[test]
    fn debug_output_is_redacted() {
        let config = source_config(Some("super-secret-token"), false);
        let provider = CredentialProvider::resolve_from(&config, None).unwrap();
        let debug = format!("{provider:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("REDACTED"));
    }
}
