//! In-memory sink for dry runs and tests.

use crate::error::SinkError;
use crate::procedure::{ProcedureRow, ProcedureValue};
use crate::traits::{BulkSink, ProcedureSink};
use pipeline_core::Record;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Procedure returning `row_count`, `even_sum`, and `decimal_median`.
pub const ROW_STATS_PROCEDURE: &str = "row_stats";

/// Procedure deleting every stored row.
pub const TRUNCATE_PROCEDURE: &str = "truncate_rows";

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Record>,
    next_handle: u64,
    open_handles: u64,
}

/// Handle returned by [`MemorySink::open`].
#[derive(Debug)]
pub struct MemoryHandle {
    id: u64,
}

/// Sink that keeps committed rows in memory.
///
/// Clones share the same storage. Failures can be injected to exercise
/// error paths: `failing_connect` makes every `open` fail,
/// `fail_after_rows(n)` makes a write fail as soon as the rows stored when
/// it started plus the rows it sent would exceed `n`, and `failing_commit`
/// makes every write fail after all of its chunks were reported.
///
/// Staged rows are only appended when a write completes, so concurrent
/// writes interleave their chunks but never their rows.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
    fail_connect: bool,
    fail_commit: bool,
    fail_after_rows: Option<u64>,
    yield_between_chunks: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn fail_after_rows(mut self, limit: u64) -> Self {
        self.fail_after_rows = Some(limit);
        self
    }

    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Yield to the scheduler after every chunk, like a network sink would.
    pub fn yield_between_chunks(mut self) -> Self {
        self.yield_between_chunks = true;
        self
    }

    /// Snapshot of the committed rows.
    pub async fn records(&self) -> Vec<Record> {
        self.state.lock().await.rows.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.rows.is_empty()
    }

    /// Handles opened and not yet closed.
    pub async fn open_handles(&self) -> u64 {
        self.state.lock().await.open_handles
    }

    fn row_stats(rows: &[Record]) -> ProcedureRow {
        let even_sum = rows
            .iter()
            .fold(0i64, |sum, r| sum.saturating_add(r.even_value));

        let median = if rows.is_empty() {
            ProcedureValue::Null
        } else {
            let mut decimals: Vec<f64> = rows.iter().map(|r| r.decimal_value).collect();
            decimals.sort_by(f64::total_cmp);
            let mid = decimals.len() / 2;
            let value = if decimals.len() % 2 == 0 {
                (decimals[mid - 1] + decimals[mid]) / 2.0
            } else {
                decimals[mid]
            };
            ProcedureValue::Float(value)
        };

        ProcedureRow::new()
            .with("row_count", ProcedureValue::Int(rows.len() as i64))
            .with("even_sum", ProcedureValue::Int(even_sum))
            .with("decimal_median", median)
    }
}

#[async_trait::async_trait]
impl BulkSink for MemorySink {
    type Handle = MemoryHandle;

    async fn open(&self) -> Result<MemoryHandle, SinkError> {
        if self.fail_connect {
            return Err(SinkError::connect("memory sink configured to refuse connections"));
        }
        let mut state = self.state.lock().await;
        state.next_handle += 1;
        state.open_handles += 1;
        Ok(MemoryHandle {
            id: state.next_handle,
        })
    }

    async fn bulk_write(
        &self,
        handle: &mut MemoryHandle,
        records: &[Record],
        chunk_size: usize,
        on_chunk_sent: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64, SinkError> {
        let stored = self.state.lock().await.rows.len() as u64;
        let mut staged = Vec::with_capacity(records.len());
        let mut sent = 0u64;

        for chunk in records.chunks(chunk_size.max(1)) {
            if let Some(limit) = self.fail_after_rows {
                if stored + sent + chunk.len() as u64 > limit {
                    return Err(SinkError::write(
                        sent,
                        format!("memory sink row limit {limit} reached"),
                    ));
                }
            }
            staged.extend_from_slice(chunk);
            sent += chunk.len() as u64;
            on_chunk_sent(sent);

            if self.yield_between_chunks {
                tokio::task::yield_now().await;
            }
        }

        if self.fail_commit {
            return Err(SinkError::write(
                sent,
                "memory sink configured to fail on commit",
            ));
        }

        self.state.lock().await.rows.append(&mut staged);
        debug!("Memory sink handle {} stored {} rows", handle.id, sent);
        Ok(sent)
    }

    async fn close(&self, handle: MemoryHandle) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        state.open_handles = state.open_handles.saturating_sub(1);
        debug!("Memory sink handle {} closed", handle.id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProcedureSink for MemorySink {
    async fn call_query(&self, name: &str) -> Result<Option<ProcedureRow>, SinkError> {
        match name {
            ROW_STATS_PROCEDURE => {
                let state = self.state.lock().await;
                Ok(Some(Self::row_stats(&state.rows)))
            }
            TRUNCATE_PROCEDURE => {
                self.call_void(name).await?;
                Ok(None)
            }
            _ => Err(SinkError::procedure(name, "unknown procedure")),
        }
    }

    async fn call_void(&self, name: &str) -> Result<(), SinkError> {
        match name {
            TRUNCATE_PROCEDURE => {
                self.state.lock().await.rows.clear();
                Ok(())
            }
            ROW_STATS_PROCEDURE => Ok(()),
            _ => Err(SinkError::procedure(name, "unknown procedure")),
        }
    }
}
