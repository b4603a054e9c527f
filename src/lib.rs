//! materialize-sync library
//!
//! Command-line driver for the Materialize destination: change records are
//! read as JSON lines and written to Materialize in batches.
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply records from a file
//! materialize-sync write \
//!   --url postgres://materialize@localhost:6875/materialize \
//!   --table users --key id \
//!   --input changes.jsonl
//!
//! # Records from stdin, settings from the environment
//! MATERIALIZE_URL=... MATERIALIZE_TABLE=users MATERIALIZE_KEY=id \
//!   materialize-sync write < changes.jsonl
//!
//! # Print the connector specification
//! materialize-sync spec
//! ```
//!
//! Each input line is one record:
//!
//! ```json
//! {"operation":"update","key":{"id":1},"payload":{"after":{"id":1,"name":"Ada"}}}
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use materialize_sink::config::{KEY_KEY, KEY_TABLE, KEY_URL};
use materialize_sink::{DestinationError, Sink};
use sink_core::Record;
use std::collections::HashMap;
use std::io::BufRead;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Clone, Debug)]
pub struct MaterializeOpts {
    /// Connection URL of the Materialize instance
    #[arg(long, env = "MATERIALIZE_URL")]
    pub url: String,

    /// Table written to when a record has no table override
    #[arg(long, env = "MATERIALIZE_TABLE")]
    pub table: String,

    /// Column used to match rows on update and delete
    #[arg(long, env = "MATERIALIZE_KEY")]
    pub key: String,

    /// Number of records handed to the destination per write
    #[arg(long, default_value = "1000")]
    pub batch_size: usize,
}

impl MaterializeOpts {
    /// Destination settings map for these options.
    pub fn to_settings(&self) -> HashMap<String, String> {
        HashMap::from([
            (KEY_URL.to_string(), self.url.clone()),
            (KEY_TABLE.to_string(), self.table.clone()),
            (KEY_KEY.to_string(), self.key.clone()),
        ])
    }
}

/// Decode one record per non-blank line.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.with_context(|| format!("Failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("Error parsing record at line {line_number}"))?;
        records.push(record);
    }

    Ok(records)
}

/// Write `records` in batches of `batch_size`, stopping at the first error.
///
/// Returns the total number of records written.
pub async fn write_batches<S: Sink>(
    sink: &mut S,
    cancel: &CancellationToken,
    records: &[Record],
    batch_size: usize,
) -> Result<usize> {
    let mut total = 0;

    for (batch_number, batch) in records.chunks(batch_size.max(1)).enumerate() {
        let written = match sink.write(cancel, batch).await {
            Ok(written) => written,
            Err(e) => {
                // Records of the failing batch before the bad one were applied
                let partial = match &e {
                    DestinationError::Write(write) => write.written,
                    _ => 0,
                };
                return Err(anyhow::Error::new(e).context(format!(
                    "Batch {} failed after {} record(s) written",
                    batch_number + 1,
                    total + partial
                )));
            }
        };
        total += written;
        info!("Batch {}: wrote {} record(s)", batch_number + 1, written);
    }

    Ok(total)
}
