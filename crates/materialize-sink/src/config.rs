//! Destination configuration.
//!
//! The host hands the connector a flat string map; exactly three settings are
//! read from it and all three are required.

use crate::error::ConfigError;
use std::collections::HashMap;

/// Config name for the connection URL.
pub const KEY_URL: &str = "url";
/// Config name for the default table.
pub const KEY_TABLE: &str = "table";
/// Config name for the default key column.
pub const KEY_KEY: &str = "key";

/// Maximum identifier length in Materialize and PostgreSQL.
///
/// See <https://www.postgresql.org/docs/current/sql-syntax-lexical.html#SQL-SYNTAX-IDENTIFIERS>.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validated destination configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Connection URL of the Materialize instance
    pub url: String,

    /// Table written to when a record has no table override
    pub table: String,

    /// Key column used when a record's key is empty
    pub key: String,
}

impl Config {
    /// Parse and validate a settings map.
    pub fn parse(settings: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| settings.get(name).cloned().unwrap_or_default();

        let config = Self {
            url: get(KEY_URL),
            table: get(KEY_TABLE),
            key: get(KEY_KEY),
        };
        config.validate()?;

        Ok(config)
    }

    /// Check every setting, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Missing(KEY_URL));
        }
        if let Err(source) = self.url.parse::<tokio_postgres::Config>() {
            return Err(ConfigError::InvalidUrl {
                field: KEY_URL,
                source,
            });
        }

        check_identifier(KEY_TABLE, &self.table)?;
        check_identifier(KEY_KEY, &self.key)?;

        Ok(())
    }

    /// Settings map equivalent of this config.
    pub fn to_settings(&self) -> HashMap<String, String> {
        HashMap::from([
            (KEY_URL.to_string(), self.url.clone()),
            (KEY_TABLE.to_string(), self.table.clone()),
            (KEY_KEY.to_string(), self.key.clone()),
        ])
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Missing(field));
    }

    let len = value.chars().count();
    if len > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::TooLong {
            field,
            max: MAX_IDENTIFIER_LENGTH,
            len,
        });
    }

    Ok(())
}
