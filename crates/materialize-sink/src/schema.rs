//! Column type introspection.

use crate::connection::Querier;
use anyhow::{bail, Context, Result};
use materialize_types::ColumnTypes;

/// Selects column names and their data types from the information_schema.
pub const QUERY_COLUMN_TYPES: &str =
    "select column_name, data_type from information_schema.columns where table_name = $1";

/// Read the declared column types of `table`.
///
/// A table the catalog doesn't know yields an empty map.
pub async fn load_column_types<Q>(querier: &Q, table: &str) -> Result<ColumnTypes>
where
    Q: Querier + ?Sized,
{
    let rows = querier
        .query_text(QUERY_COLUMN_TYPES, &[table])
        .await
        .context("query column types")?;

    rows.into_iter()
        .map(scan_row)
        .collect::<Result<ColumnTypes>>()
        .context("scan rows")
}

fn scan_row(row: Vec<Option<String>>) -> Result<(String, String)> {
    match <[Option<String>; 2]>::try_from(row) {
        Ok([Some(column_name), Some(data_type)]) => Ok((column_name, data_type)),
        Ok(row) => bail!("unexpected NULL in catalog row {row:?}"),
        Err(row) => bail!("expected 2 columns, got {}", row.len()),
    }
}
