//! Connection traits and the `tokio-postgres` implementation.
//!
//! The destination only needs three capabilities from the database: run a
//! read query (schema introspection), execute a statement, and close. They
//! are traits so the destination can be driven against an in-memory fake.

use crate::statement::Statement;
use anyhow::{Context, Result};
use async_trait::async_trait;
use materialize_types::{as_sql_params, TextColumn};
use sink_core::Value;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

/// Runs parameterized read queries.
#[async_trait]
pub trait Querier: Send + Sync {
    /// Run `query` with text parameters. Each row is returned as its
    /// columns' text values, `None` for NULL.
    async fn query_text(&self, query: &str, params: &[&str]) -> Result<Vec<Vec<Option<String>>>>;
}

/// An open destination connection.
#[async_trait]
pub trait Connection: Querier {
    /// Execute a statement, returning the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<u64>;

    /// Close the connection.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens connections from a connection URL.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    async fn connect(&self, url: &str) -> Result<Self::Connection>;
}

/// Connector for Materialize over the PostgreSQL wire protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl Connector for PgConnector {
    type Connection = PgConnection;

    async fn connect(&self, url: &str) -> Result<PgConnection> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .context("Failed to connect to Materialize")?;

        // Spawn the connection task
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Materialize connection error: {}", e);
            }
        });

        Ok(PgConnection { client, task })
    }
}

/// A `tokio-postgres` client with its connection task.
pub struct PgConnection {
    client: Client,
    task: JoinHandle<()>,
}

#[async_trait]
impl Querier for PgConnection {
    async fn query_text(&self, query: &str, params: &[&str]) -> Result<Vec<Vec<Option<String>>>> {
        let values: Vec<Value> = params.iter().map(|p| Value::from(*p)).collect();
        let params = as_sql_params(&values);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = self.client.query(query, &param_refs).await?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| {
                        row.try_get::<_, Option<TextColumn>>(i)
                            .map(|col| col.map(|c| c.0))
                            .with_context(|| format!("scan column {i}"))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

#[async_trait]
impl Connection for PgConnection {
    async fn execute(&self, statement: &Statement) -> Result<u64> {
        let params = as_sql_params(&statement.args);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let affected = self.client.execute(&statement.sql, &param_refs).await?;
        debug!("{} row(s) affected by: {}", affected, statement.sql);

        Ok(affected)
    }

    async fn close(self) -> Result<()> {
        // The connection task finishes once the client is gone
        drop(self.client);
        self.task.await.context("Materialize connection task failed")?;
        Ok(())
    }
}
