//! Destination plugin trait.

use crate::error::DestinationError;
use async_trait::async_trait;
use sink_core::Record;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a destination connector as driven by the pipeline host.
///
/// The host calls `configure`, then `open`, then `write` any number of
/// times, and finally `teardown`. Calls are never concurrent.
///
/// # Usage Pattern
///
/// ```ignore
/// async fn deliver<S: Sink>(sink: &mut S, batches: Vec<Vec<Record>>) -> Result<(), DestinationError> {
///     let cancel = CancellationToken::new();
///     sink.configure(&settings).await?;
///     sink.open(&cancel).await?;
///     for batch in &batches {
///         sink.write(&cancel, batch).await?;
///     }
///     sink.teardown().await
/// }
/// ```
#[async_trait]
pub trait Sink: Send {
    /// Parse and store the settings. Nothing is connected yet.
    async fn configure(&mut self, settings: &HashMap<String, String>)
        -> Result<(), DestinationError>;

    /// Connect and read the column types of the default table.
    async fn open(&mut self, cancel: &CancellationToken) -> Result<(), DestinationError>;

    /// Apply records in order, stopping at the first failure.
    ///
    /// Returns the number of records written. On failure the error carries
    /// the failing index and how many records before it were applied.
    async fn write(
        &mut self,
        cancel: &CancellationToken,
        records: &[Record],
    ) -> Result<usize, DestinationError>;

    /// Close the connection if one is open. Safe to call more than once.
    async fn teardown(&mut self) -> Result<(), DestinationError>;
}
