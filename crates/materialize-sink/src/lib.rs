//! Materialize destination.
//!
//! Applies change records to Materialize (or PostgreSQL) over the PostgreSQL
//! wire protocol. Creates and snapshots become `INSERT`s, updates become
//! `UPDATE ... WHERE key = ...` and deletes become `DELETE ... WHERE key = ...`.
//! A batch is written in order and stops at the first record that fails.
//!
//! # Example
//!
//! ```ignore
//! use materialize_sink::{Destination, Sink};
//!
//! let mut destination = Destination::new();
//! destination.configure(&settings).await?;
//! destination.open(&cancel).await?;
//! let written = destination.write(&cancel, &records).await?;
//! destination.teardown().await?;
//! ```

pub mod config;
pub mod connection;
pub mod destination;
pub mod error;
pub mod handler;
pub mod resolve;
pub mod router;
pub mod schema;
pub mod sink;
pub mod spec;
pub mod statement;

pub use config::Config;
pub use connection::{Connection, Connector, PgConnection, PgConnector, Querier};
pub use destination::Destination;
pub use error::{ConfigError, DestinationError, RecordError, WriteError};
pub use sink::Sink;
pub use spec::{specification, Parameter, Specification};
pub use statement::{BuildError, Placeholder, Statement, StatementBuilder};
