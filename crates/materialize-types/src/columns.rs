//! Column type map built from the destination catalog.

use std::collections::HashMap;

/// Declared type name of a TIME column as reported by Materialize.
pub const TIME_DATA_TYPE: &str = "time";

/// The same type as reported by PostgreSQL's information_schema.
pub const TIME_DATA_TYPE_LONG: &str = "time without time zone";

/// Coarse classification of a declared column type.
///
/// Only the kinds that need value coercion are distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// TIME without time zone
    Time,
    /// Anything the destination accepts without rewriting
    Other,
}

impl ColumnKind {
    /// Classify a lowercase declared data type.
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type {
            TIME_DATA_TYPE | TIME_DATA_TYPE_LONG => Self::Time,
            _ => Self::Other,
        }
    }
}

/// Lowercase column name → lowercase declared data type.
///
/// Built once when the destination opens and read-only afterwards. A column
/// with no entry gets no special coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes {
    types: HashMap<String, String>,
}

impl ColumnTypes {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared data type of a column, if known.
    pub fn data_type(&self, column: &str) -> Option<&str> {
        self.types.get(&column.to_lowercase()).map(String::as_str)
    }

    /// Coercion kind of a column. Unknown columns are [`ColumnKind::Other`].
    pub fn kind(&self, column: &str) -> ColumnKind {
        self.data_type(column)
            .map(ColumnKind::from_data_type)
            .unwrap_or(ColumnKind::Other)
    }

    /// Number of known columns.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no columns are known.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnTypes
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            types: iter
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.as_ref().to_lowercase()))
                .collect(),
        }
    }
}
