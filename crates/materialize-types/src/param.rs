//! Statement parameter encoding for `tokio-postgres`.
//!
//! Every value is sent in the text format and the server parses the literal
//! into the column's declared type. Materialize and PostgreSQL infer the
//! parameter types from the statement, so an integer payload can land in an
//! `integer`, `bigint` or `numeric` column without the client knowing which.

use bytes::BytesMut;
use postgres_types::{to_sql_checked, Format, FromSql, IsNull, ToSql, Type};
use sink_core::Value;
use std::error::Error;

/// Borrowed [`Value`] bound as a statement parameter.
#[derive(Debug, Clone, Copy)]
pub struct PgParam<'a>(pub &'a Value);

impl PgParam<'_> {
    /// Text literal of the value, `None` for NULL.
    pub fn to_text(&self) -> Option<String> {
        match self.0 {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(float_literal(*f)),
            Value::String(s) | Value::Json(s) => Some(s.clone()),
            Value::Timestamp(ts) => Some(ts.to_rfc3339()),
        }
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

impl ToSql for PgParam<'_> {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.to_text() {
            Some(text) => {
                out.extend_from_slice(text.as_bytes());
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

/// Wrap statement arguments for `tokio_postgres::Client::execute`.
///
/// The caller keeps the returned vector alive and passes
/// `&params.iter().map(|p| p as &(dyn ToSql + Sync)).collect::<Vec<_>>()`.
pub fn as_sql_params(values: &[Value]) -> Vec<PgParam<'_>> {
    values.iter().map(PgParam).collect()
}

/// Text column read back from a query, whatever its declared type.
///
/// Catalog columns such as `information_schema.columns.column_name` are
/// domains over `name`/`varchar`, which `String` does not accept. Their
/// binary representation is plain UTF-8, so it is decoded directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextColumn(pub String);

impl<'a> FromSql<'a> for TextColumn {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}
