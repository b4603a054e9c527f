//! Per-record table and key column resolution.

use crate::config::Config;
use crate::error::RecordError;
use sink_core::{StructuredData, METADATA_TABLE};
use std::collections::HashMap;

/// Resolves the destination table and key column of a record from its
/// metadata and key, falling back to the configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResolver {
    default_table: String,
    default_key: String,
}

impl TargetResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            default_table: config.table.to_lowercase(),
            default_key: config.key.to_lowercase(),
        }
    }

    /// Lowercased default table.
    pub fn default_table(&self) -> &str {
        &self.default_table
    }

    /// Metadata `table` override, else the default table. Always lowercase.
    pub fn resolve_table(&self, metadata: &HashMap<String, String>) -> String {
        match metadata.get(METADATA_TABLE) {
            Some(table) => table.to_lowercase(),
            None => self.default_table.clone(),
        }
    }

    /// The only column of `key`, else the default key column.
    pub fn resolve_key_column(&self, key: &StructuredData) -> Result<String, RecordError> {
        let mut columns = key.keys();
        match (columns.next(), key.len()) {
            (None, _) => Ok(self.default_key.clone()),
            (Some(column), 1) => Ok(column.to_lowercase()),
            (Some(_), n) => Err(RecordError::CompositeKeyUnsupported { columns: n }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sink_core::Value;

    fn resolver() -> TargetResolver {
        TargetResolver::new(&Config {
            url: "postgres://localhost:6875/materialize".to_string(),
            table: "FooTable".to_string(),
            key: "ID".to_string(),
        })
    }

    fn key(columns: &[&str]) -> StructuredData {
        columns
            .iter()
            .map(|c| (c.to_string(), Value::Int(1)))
            .collect()
    }

    #[test]
    fn test_table_override_is_lowercased() {
        let metadata = HashMap::from([(METADATA_TABLE.to_string(), "Orders".to_string())]);
        assert_eq!(resolver().resolve_table(&metadata), "orders");
    }

    #[test]
    fn test_default_table_is_lowercased() {
        assert_eq!(resolver().resolve_table(&HashMap::new()), "footable");
        assert_eq!(resolver().default_table(), "footable");
    }

    #[test]
    fn test_single_key_column() {
        assert_eq!(resolver().resolve_key_column(&key(&["user_id"])).unwrap(), "user_id");
    }

    #[test]
    fn test_empty_key_uses_default() {
        assert_eq!(resolver().resolve_key_column(&key(&[])).unwrap(), "id");
    }

    #[test]
    fn test_composite_key_is_rejected() {
        let err = resolver().resolve_key_column(&key(&["a", "b"])).unwrap_err();
        assert!(matches!(err, RecordError::CompositeKeyUnsupported { columns: 2 }));
    }
}
