//! Core types for the materialize sink.
//!
//! This crate provides the foundational types shared by the sink crates:
//!
//! - [`Value`] - Closed set of column values a change record can carry
//! - [`Record`] - A single change event (create/update/delete/snapshot)
//! - [`RecordData`] - Key or payload data, either structured or raw JSON bytes
//! - [`StructuredData`] - Column name to value mapping
//!
//! # Architecture
//!
//! ```text
//! sink-core (this crate)
//!    │
//!    ├─── materialize-types  (coercion and PostgreSQL parameter encoding)
//!    └─── materialize-sink   (statement building and the destination)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sink_core::{Operation, Record, RecordData, Value};
//!
//! let record = Record::new(Operation::Create)
//!     .with_key(RecordData::structured([("id", Value::Int(1))]))
//!     .with_after(RecordData::raw(br#"{"id":1,"name":"Alice"}"#.to_vec()));
//!
//! assert_eq!(record.operation, Operation::Create);
//! ```

pub mod record;
pub mod values;

pub use record::{
    DecodeError, Operation, Payload, Record, RecordData, StructuredData, METADATA_ACTION,
    METADATA_TABLE,
};
pub use values::Value;
