use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::SerializableSecretString;
use crate::shared::ValidationError;

/// Configuration for connecting to a Postgres database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PgConnectionConfig {
    /// Hostname or IP address of the Postgres server.
    pub host: String,
    /// Port number on which the Postgres server is listening.
    pub port: u16,
    /// Name of the Postgres database to connect to.
    pub name: String,
    /// Username for authenticating with the Postgres server.
    pub username: String,
    /// Password for the specified user. Sensitive and redacted in debug output.
    pub password: Option<SerializableSecretString>,
    /// Whether to require a TLS connection to the server.
    #[serde(default)]
    pub require_tls: bool,
}

impl PgConnectionConfig {
    /// Creates sqlx connection options for connecting to the configured database.
    pub fn with_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_tls {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .ssl_mode(ssl_mode)
            .database(&self.name);

        if let Some(password) = &self.password {
            options.password(password.expose_secret())
        } else {
            options
        }
    }

    /// Validates the connection configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::InvalidDestination(
                "Postgres host cannot be empty".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(ValidationError::InvalidDestination(
                "Postgres database name cannot be empty".to_string(),
            ));
        }
        if self.username.is_empty() {
            return Err(ValidationError::InvalidDestination(
                "Postgres username cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
