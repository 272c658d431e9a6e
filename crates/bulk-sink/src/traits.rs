//! Sink trait definitions.
//!
//! These traits abstract over the data store the pipeline loads into, so the
//! import driver compiles against one interface that works with PostgreSQL
//! as well as the in-memory sink.

use crate::error::SinkError;
use crate::procedure::ProcedureRow;
use pipeline_core::Record;

/// Trait for bulk-loading records into a data store.
///
/// # Usage Pattern
///
/// The import driver uses generics for zero-cost dispatch:
///
/// ```ignore
/// pub async fn import_file<S: BulkSink>(sink: &S, records: &[Record]) -> Result<(), SinkError> {
///     let mut handle = sink.open().await?;
///     sink.bulk_write(&mut handle, records, 1000, &mut |sent| println!("{sent}")).await?;
///     sink.close(handle).await
/// }
/// ```
///
/// Each import task opens its own handle and owns it for the duration of
/// one file.
#[async_trait::async_trait]
pub trait BulkSink: Send + Sync {
    /// Connection or session used by one import task.
    type Handle: Send;

    /// Open a handle. Fails with [`SinkError::Connect`].
    async fn open(&self) -> Result<Self::Handle, SinkError>;

    /// Write all `records` as one unit, in order.
    ///
    /// `on_chunk_sent` is called after every `chunk_size` rows (and after a
    /// final partial chunk) with the cumulative number of rows sent. Sent
    /// rows are durable only once this returns `Ok`: either every record is
    /// written or, on [`SinkError::Write`], none are, even if every chunk
    /// was already reported. Returns the number of rows written.
    async fn bulk_write(
        &self,
        handle: &mut Self::Handle,
        records: &[Record],
        chunk_size: usize,
        on_chunk_sent: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64, SinkError>;

    /// Release a handle.
    async fn close(&self, handle: Self::Handle) -> Result<(), SinkError>;
}

/// Trait for calling named remote procedures.
#[async_trait::async_trait]
pub trait ProcedureSink: Send + Sync {
    /// Call a procedure that returns a result set, yielding its first row.
    async fn call_query(&self, name: &str) -> Result<Option<ProcedureRow>, SinkError>;

    /// Call a procedure for its side effects.
    async fn call_void(&self, name: &str) -> Result<(), SinkError>;
}
