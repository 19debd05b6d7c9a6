use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::{PgConnectionConfig, ValidationError};

/// Default name of the destination table.
const DEFAULT_TABLE_NAME: &str = "crimes";

/// Configuration options for supported data destinations.
///
/// Variants correspond to the different table stores the merge loader can
/// write to.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationConfig {
    /// In-memory destination for ephemeral or test data.
    Memory,
    /// Postgres destination configuration.
    Postgres {
        /// Connection parameters of the destination database.
        connection: PgConnectionConfig,
        /// Name of the table records are merged into.
        #[serde(default = "default_table_name")]
        table: String,
    },
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

impl DestinationConfig {
    /// Validates the destination configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Memory => Ok(()),
            Self::Postgres { connection, table } => {
                connection.validate()?;

                if table.is_empty() {
                    return Err(ValidationError::InvalidDestination(
                        "Destination table name cannot be empty".to_string(),
                    ));
                }
                // The table name is interpolated into SQL statements, so it is
                // restricted to identifier characters.
                if !table
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(ValidationError::InvalidDestination(format!(
                        "Destination table name '{table}' contains invalid characters"
                    )));
                }

                Ok(())
            }
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("Memory"),
            Self::Postgres { connection, table } => f
                .debug_struct("Postgres")
                .field("host", &connection.host)
                .field("port", &connection.port)
                .field("name", &connection.name)
                .field("username", &connection.username)
                .field("password", &"REDACTED")
                .field("table", table)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres_config(table: &str) -> DestinationConfig {
        DestinationConfig::Postgres {
            connection: PgConnectionConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "warehouse".to_string(),
                username: "loader".to_string(),
                password: None,
                require_tls: false,
            },
            table: table.to_string(),
        }
    }

    #[test]
    fn memory_destination_is_always_valid() {
        assert!(DestinationConfig::Memory.validate().is_ok());
    }

    #[test]
    fn accepts_identifier_table_names() {
        assert!(postgres_config("crimes").validate().is_ok());
        assert!(postgres_config("crime_records_2025").validate().is_ok());
    }

    #[test]
    fn rejects_table_names_with_sql_characters() {
        assert!(postgres_config("crimes; drop table users").validate().is_err());
        assert!(postgres_config("\"crimes\"").validate().is_err());
        assert!(postgres_config("").validate().is_err());
    }
}
