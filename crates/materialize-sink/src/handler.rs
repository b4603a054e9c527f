//! Per-record statement handlers.

use crate::connection::Connection;
use crate::error::RecordError;
use crate::resolve::TargetResolver;
use crate::router::Route;
use crate::statement::{Statement, StatementBuilder};
use materialize_types::{coerce_columns, ColumnTypes};
use sink_core::{Record, RecordData, StructuredData, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Applies records to an open connection.
///
/// Column types are those of the default table, read once at open.
pub struct RecordWriter<T: Connection> {
    conn: T,
    resolver: TargetResolver,
    column_types: ColumnTypes,
    builder: StatementBuilder,
}

impl<T: Connection> RecordWriter<T> {
    pub fn new(conn: T, resolver: TargetResolver, column_types: ColumnTypes) -> Self {
        Self {
            conn,
            resolver,
            column_types,
            builder: StatementBuilder::default(),
        }
    }

    pub fn column_types(&self) -> &ColumnTypes {
        &self.column_types
    }

    /// Give back the connection, e.g. to close it.
    pub fn into_connection(self) -> T {
        self.conn
    }

    /// Apply one record.
    pub async fn write_record(
        &self,
        cancel: &CancellationToken,
        record: &Record,
    ) -> Result<(), RecordError> {
        match Route::of(record)? {
            Route::Insert => self.insert(cancel, record).await,
            Route::Update => self.update(cancel, record).await,
            Route::Delete => self.delete(cancel, record).await,
        }
    }

    async fn insert(&self, cancel: &CancellationToken, record: &Record) -> Result<(), RecordError> {
        let table = self.resolver.resolve_table(&record.metadata);
        let payload = self.payload_columns(&record.payload.after)?;

        let (columns, values): (Vec<String>, Vec<Value>) = payload.into_iter().unzip();
        let statement = self.builder.insert(&table, &columns, values)?;

        self.execute(cancel, Route::Insert, &statement).await
    }

    async fn update(&self, cancel: &CancellationToken, record: &Record) -> Result<(), RecordError> {
        let table = self.resolver.resolve_table(&record.metadata);
        let (key_column, key_value) = self.key(&record.key)?;

        let mut payload = self.payload_columns(&record.payload.after)?;
        // The key column is matched on, never assigned
        payload.remove(&key_column);

        let (columns, values): (Vec<String>, Vec<Value>) = payload.into_iter().unzip();
        let statement = self
            .builder
            .update(&table, &columns, values, &key_column, key_value)?;

        self.execute(cancel, Route::Update, &statement).await
    }

    async fn delete(&self, cancel: &CancellationToken, record: &Record) -> Result<(), RecordError> {
        let table = self.resolver.resolve_table(&record.metadata);
        let (key_column, key_value) = self.key(&record.key)?;

        let statement = self.builder.delete(&table, &key_column, key_value)?;

        self.execute(cancel, Route::Delete, &statement).await
    }

    /// Key column and its value. A missing or NULL value is an empty key.
    fn key(&self, key: &RecordData) -> Result<(String, Value), RecordError> {
        let key = key
            .to_columns()
            .map_err(|source| RecordError::PayloadDecodeFailed { part: "key", source })?;
        let column = self.resolver.resolve_key_column(&key)?;

        match key.get(&column) {
            Some(value) if !value.is_null() => Ok((column, value.clone())),
            _ => Err(RecordError::EmptyKey { column }),
        }
    }

    /// Decoded and coerced payload. Empty payloads are rejected.
    fn payload_columns(&self, after: &RecordData) -> Result<StructuredData, RecordError> {
        let payload = after
            .to_columns()
            .map_err(|source| RecordError::PayloadDecodeFailed {
                part: "payload",
                source,
            })?;
        if payload.is_empty() {
            return Err(RecordError::EmptyPayload);
        }

        Ok(coerce_columns(&self.column_types, payload)?)
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        route: Route,
        statement: &Statement,
    ) -> Result<(), RecordError> {
        debug!("Executing {}: {}", route, statement.sql);

        let affected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RecordError::Cancelled),
            result = self.conn.execute(statement) => result.map_err(|source| {
                RecordError::StatementExecutionFailed {
                    statement: route.as_str(),
                    source,
                }
            })?,
        };

        if affected == 0 && route != Route::Insert {
            warn!("{} matched no rows: {}", route, statement.sql);
        }

        Ok(())
    }
}
