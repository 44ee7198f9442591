//! Persistence port for the four record streams.

use async_trait::async_trait;

use crate::domain::RecordBatch;
use crate::error::Result;

/// A durable store for runner names, market info, results and market data.
///
/// A write must be safe to repeat with the same batch: either the store
/// dedupes, or each stream is written all-or-nothing.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &'static str;

    /// Append every stream of the batch.
    async fn write(&self, batch: &RecordBatch) -> Result<()>;
}
