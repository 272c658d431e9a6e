//! Bulk loading of one data file into a sink.

use crate::error::ImportError;
use bulk_sink::BulkSink;
use pipeline_core::{parse_line, ProgressSink, Record};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one successfully imported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImport {
    pub path: PathBuf,
    pub rows: u64,
}

/// Parsed records of one file with the send counters.
#[derive(Debug)]
struct ImportBatch {
    records: Vec<Record>,
    total_rows: u64,
    rows_sent: u64,
}

/// Imports data files into a [`BulkSink`] and reports progress.
///
/// One loader is shared by every import task of a run; it owns the file
/// counter so the file progress stays consistent under concurrency.
#[derive(Debug)]
pub struct BulkLoader {
    chunk_size: usize,
    files_total: u64,
    files_done: AtomicU64,
}

impl BulkLoader {
    pub fn new(chunk_size: usize, files_total: u64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            files_total,
            files_done: AtomicU64::new(0),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Files finished (imported or skipped) so far.
    pub fn files_done(&self) -> u64 {
        self.files_done.load(Ordering::Relaxed)
    }

    /// Import one file.
    ///
    /// The whole file is parsed before anything is sent, so a malformed line
    /// leaves the sink untouched. Row progress for `path` starts at zero
    /// with the row count as upper bound, rises monotonically with every
    /// chunk the sink reports as sent, ends exactly at the row count, and
    /// is reset to zero once the file is done or has failed. Only a file
    /// the sink accepted advances the file counter.
    pub async fn import_file<S: BulkSink>(
        &self,
        path: &Path,
        sink: &S,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<FileImport, ImportError> {
        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let records = read_records(path).await?;
        let mut batch = ImportBatch {
            total_rows: records.len() as u64,
            records,
            rows_sent: 0,
        };
        let total = batch.total_rows;
        progress.on_row_progress(path, 0, total);

        let sent = if cancel.is_cancelled() {
            Err(ImportError::Cancelled)
        } else if total == 0 {
            debug!("'{}' is empty, nothing to import", path.display());
            Ok(0)
        } else {
            self.send(path, sink, &batch.records, progress).await
        };

        progress.on_row_progress(path, 0, total);
        batch.rows_sent = sent?;
        self.advance_file_counter(progress);

        info!("Imported {} rows from '{}'", batch.rows_sent, path.display());
        Ok(FileImport {
            path: path.to_path_buf(),
            rows: batch.rows_sent,
        })
    }

    /// Count a file that was skipped without importing it.
    pub fn mark_file_skipped(&self, progress: &dyn ProgressSink) {
        self.advance_file_counter(progress);
    }

    fn advance_file_counter(&self, progress: &dyn ProgressSink) {
        let done = self.files_done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.on_file_progress(done, self.files_total);
    }

    async fn send<S: BulkSink>(
        &self,
        path: &Path,
        sink: &S,
        records: &[Record],
        progress: &dyn ProgressSink,
    ) -> Result<u64, ImportError> {
        let sink_error = |source| ImportError::Sink {
            path: path.to_path_buf(),
            source,
        };
        let total = records.len() as u64;

        let mut handle = sink.open().await.map_err(sink_error)?;

        let mut reported = 0u64;
        let mut on_chunk = |sent: u64| {
            let current = sent.min(total);
            if current > reported {
                reported = current;
                progress.on_row_progress(path, current, total);
            }
        };

        let written = sink
            .bulk_write(&mut handle, records, self.chunk_size, &mut on_chunk)
            .await;

        let written = match written {
            Ok(written) => written,
            Err(e) => {
                if let Err(close_err) = sink.close(handle).await {
                    warn!("Failed to close sink after write error: {close_err}");
                }
                return Err(sink_error(e));
            }
        };

        if reported < total {
            progress.on_row_progress(path, total, total);
        }

        sink.close(handle).await.map_err(sink_error)?;
        Ok(written)
    }
}

/// Read and parse every line of a data file.
pub async fn read_records(path: &Path) -> Result<Vec<Record>, ImportError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    content
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            parse_line(line).map_err(|source| ImportError::Parse {
                path: path.to_path_buf(),
                line: idx as u64 + 1,
                source,
            })
        })
        .collect()
}
