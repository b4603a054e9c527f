//! Error types for the Materialize destination.

use crate::statement::BuildError;
use materialize_types::CoercionError;
use sink_core::{DecodeError, Operation};
use thiserror::Error;

/// Invalid destination settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required setting is absent or empty
    #[error("{0:?} config value must be set")]
    Missing(&'static str),

    /// Identifier setting exceeds the destination's limit
    #[error("{field:?} config value must be at most {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    /// Connection URL cannot be parsed
    #[error("{field:?} config value is not a valid connection URL: {source}")]
    InvalidUrl {
        field: &'static str,
        source: tokio_postgres::Error,
    },
}

/// Errors of the destination lifecycle.
#[derive(Error, Debug)]
pub enum DestinationError {
    /// Configure rejected the settings.
    #[error("failed to parse config: {0}")]
    ConfigInvalid(#[from] ConfigError),

    /// Open could not connect.
    #[error("failed to connect to materialize: {0}")]
    ConnectionFailed(#[source] anyhow::Error),

    /// Open could not read the column types of the default table.
    #[error("failed to get column types of table '{table}': {source}")]
    SchemaIntrospectionFailed {
        table: String,
        #[source]
        source: anyhow::Error,
    },

    /// Open called before a successful configure.
    #[error("destination is not configured")]
    NotConfigured,

    /// Write called while the destination is not open.
    #[error("destination is not open")]
    NotOpen,

    /// Configure or open called on an open destination.
    #[error("destination is already open")]
    AlreadyOpen,

    /// A record of the batch failed.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Closing the connection failed.
    #[error("failed to close connection: {0}")]
    TeardownFailed(#[source] anyhow::Error),
}

/// Why a single record could not be written.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Insert or update without any column data
    #[error("payload is empty")]
    EmptyPayload,

    /// Update or delete without a value for the key column
    #[error("key value for column '{column}' is empty")]
    EmptyKey { column: String },

    /// Key names more than one column
    #[error("composite keys not yet supported: key has {columns} columns")]
    CompositeKeyUnsupported { columns: usize },

    /// Key or payload bytes are not a JSON object
    #[error("failed to get {part}: {source}")]
    PayloadDecodeFailed {
        part: &'static str,
        #[source]
        source: DecodeError,
    },

    /// A value does not fit its declared column type
    #[error("failed to convert payload: {0}")]
    ValueCoercionFailed(#[from] CoercionError),

    /// SQL could not be generated
    #[error("error formatting query: {0}")]
    StatementBuildFailed(#[from] BuildError),

    /// The destination rejected the statement
    #[error("failed to exec {statement}: {source}")]
    StatementExecutionFailed {
        statement: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Metadata `action` is not insert, update or delete
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),

    /// Cancellation was requested before the statement completed
    #[error("cancelled")]
    Cancelled,
}

/// A batch stopped at a failing record.
///
/// `written` records before `index` were applied; nothing after it was tried.
#[derive(Error, Debug)]
#[error("failed to write record {index} ({operation}): {source}")]
pub struct WriteError {
    /// Position of the failing record in the batch
    pub index: usize,

    /// Records applied before the failure
    pub written: usize,

    /// Operation tag of the failing record
    pub operation: Operation,

    /// Source position of the failing record, if it had one
    pub position: Option<String>,

    #[source]
    pub source: RecordError,
}
