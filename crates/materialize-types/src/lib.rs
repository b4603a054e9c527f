//! Materialize type handling for sink-core values.
//!
//! This crate sits between the decoded record data and the SQL statements
//! executed against Materialize.
//!
//! # Modules
//!
//! - [`columns`] - Column name → declared data type map read from the catalog
//! - [`coerce`] - Type-directed rewriting of payload values (TIME columns)
//! - [`param`] - `tokio-postgres` parameter encoding of [`sink_core::Value`]
//!   and decoding of catalog text columns
//!
//! # Example
//!
//! ```rust
//! use materialize_types::{coerce_columns, ColumnTypes};
//! use sink_core::{StructuredData, Value};
//!
//! let column_types: ColumnTypes = [("created_at", "time")].into_iter().collect();
//! let mut data = StructuredData::new();
//! data.insert("created_at".to_string(), Value::from("0000-01-01T11:12:00Z"));
//!
//! let data = coerce_columns(&column_types, data).unwrap();
//! assert_eq!(data["created_at"], Value::from("11:12:00"));
//! ```

pub mod coerce;
pub mod columns;
pub mod param;

pub use coerce::{coerce_columns, CoercionError, TIME_LAYOUT};
pub use columns::{ColumnKind, ColumnTypes};
pub use param::{as_sql_params, PgParam, TextColumn};
