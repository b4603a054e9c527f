//! The Materialize destination.

use crate::config::Config;
use crate::connection::{Connection, Connector, PgConnector};
use crate::error::{DestinationError, WriteError};
use crate::handler::RecordWriter;
use crate::resolve::TargetResolver;
use crate::schema::load_column_types;
use crate::sink::Sink;
use async_trait::async_trait;
use sink_core::Record;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

enum State<T: Connection> {
    Unconfigured,
    Configured(Config),
    Open(RecordWriter<T>),
    Closed,
}

/// Writes change records into Materialize tables.
pub struct Destination<C: Connector = PgConnector> {
    connector: C,
    state: State<C::Connection>,
}

impl Destination<PgConnector> {
    pub fn new() -> Self {
        Self::with_connector(PgConnector)
    }
}

impl Default for Destination<PgConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> Destination<C> {
    /// Create a destination that opens connections through `connector`.
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            state: State::Unconfigured,
        }
    }

    /// The stored configuration, if configured and not yet opened.
    pub fn config(&self) -> Option<&Config> {
        match &self.state {
            State::Configured(config) => Some(config),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }
}

#[async_trait]
impl<C: Connector> Sink for Destination<C> {
    async fn configure(
        &mut self,
        settings: &HashMap<String, String>,
    ) -> Result<(), DestinationError> {
        if self.is_open() {
            return Err(DestinationError::AlreadyOpen);
        }

        let config = Config::parse(settings)?;
        debug!(
            "Configured Materialize destination: table={}, key={}",
            config.table, config.key
        );
        self.state = State::Configured(config);

        Ok(())
    }

    async fn open(&mut self, cancel: &CancellationToken) -> Result<(), DestinationError> {
        let config = match &self.state {
            State::Configured(config) => config.clone(),
            State::Open(_) => return Err(DestinationError::AlreadyOpen),
            State::Unconfigured | State::Closed => return Err(DestinationError::NotConfigured),
        };

        let conn = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(DestinationError::ConnectionFailed(anyhow::anyhow!("open cancelled")));
            }
            result = self.connector.connect(&config.url) => {
                result.map_err(DestinationError::ConnectionFailed)?
            }
        };
        info!("Connected to Materialize");

        let resolver = TargetResolver::new(&config);
        let table = resolver.default_table().to_string();

        let column_types = match load_column_types(&conn, &table).await {
            Ok(column_types) => column_types,
            Err(source) => {
                if let Err(e) = conn.close().await {
                    warn!("Failed to close connection after open failure: {e:#}");
                }
                return Err(DestinationError::SchemaIntrospectionFailed { table, source });
            }
        };
        info!(
            "Loaded {} column type(s) for table '{}'",
            column_types.len(),
            table
        );

        self.state = State::Open(RecordWriter::new(conn, resolver, column_types));

        Ok(())
    }

    async fn write(
        &mut self,
        cancel: &CancellationToken,
        records: &[Record],
    ) -> Result<usize, DestinationError> {
        let State::Open(writer) = &self.state else {
            return Err(DestinationError::NotOpen);
        };

        for (index, record) in records.iter().enumerate() {
            if let Err(source) = writer.write_record(cancel, record).await {
                warn!("Record {index} failed, stopping batch: {source}");
                return Err(WriteError {
                    index,
                    written: index,
                    operation: record.operation,
                    position: record.position.clone(),
                    source,
                }
                .into());
            }
        }

        debug!("Wrote {} record(s)", records.len());
        Ok(records.len())
    }

    async fn teardown(&mut self) -> Result<(), DestinationError> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(writer) => {
                writer
                    .into_connection()
                    .close()
                    .await
                    .map_err(DestinationError::TeardownFailed)?;
                info!("Closed Materialize connection");
            }
            _ => debug!("Teardown without an open connection"),
        }

        Ok(())
    }
}
