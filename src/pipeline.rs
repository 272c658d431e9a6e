//! Pipeline driver: generate, merge, and import stages.

use crate::config::{ParseErrorPolicy, PipelineConfig};
use crate::error::{ImportError, PipelineError};
use crate::import::BulkLoader;
use bulk_sink::BulkSink;
use line_merge::{LineMerger, MergeReport};
use pipeline_core::{list_data_files, ProgressSink};
use populate_files::{FileSetWriter, GenerateReport};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Final state of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Completed,
    /// Stopped by a sink, IO, or (with `abort-run`) parse failure
    Aborted,
    Cancelled,
}

/// A file that was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    /// 1-based line of the parse failure, if any
    pub line: Option<u64>,
    pub error: String,
}

/// Summary of an import run.
///
/// Returned even when the run stops early; `status` and `errors` say why.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub status: RunStatus,
    pub files_total: u64,
    pub files_imported: u64,
    pub rows_imported: u64,
    pub failed_files: Vec<FailedFile>,
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl ImportReport {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.rows_imported as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Reports of a full generate, merge, and import run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generate: GenerateReport,
    pub merge: MergeReport,
    pub import: ImportReport,
}

/// Runs pipeline stages against one progress sink and cancellation token.
pub struct Pipeline {
    config: PipelineConfig,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        progress: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            progress,
            cancel,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate the data files.
    pub async fn generate(&self) -> Result<GenerateReport, PipelineError> {
        let writer = FileSetWriter::new(self.config.generate.clone())?;
        let report = writer
            .generate(Arc::clone(&self.progress), self.cancel.clone())
            .await?;
        Ok(report)
    }

    /// Merge the data files into one, on the blocking pool.
    pub async fn merge(&self) -> Result<MergeReport, PipelineError> {
        let merger = LineMerger::new(self.config.merge_job());
        let progress = Arc::clone(&self.progress);
        let cancel = self.cancel.clone();

        let report = tokio::task::spawn_blocking(move || merger.merge(progress.as_ref(), &cancel))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;
        Ok(report)
    }

    /// Import every data file of the input directory into `sink`.
    ///
    /// Up to `workers` files are imported at once, each over its own sink
    /// handle. A sink or IO failure stops the run; a parse failure stops it
    /// or skips the file depending on the configured policy. Files already
    /// committed stay committed either way.
    pub async fn import<S>(&self, sink: Arc<S>) -> Result<ImportReport, PipelineError>
    where
        S: BulkSink + 'static,
    {
        let start_time = Instant::now();
        let settings = &self.config.import;
        let input_directory = self.config.import_directory();
        let mut report = ImportReport::default();

        let files = list_data_files(&input_directory).map_err(|source| ImportError::Io {
            path: input_directory.clone(),
            source,
        })?;
        report.files_total = files.len() as u64;

        info!(
            "Importing {} files from '{}' ({} workers, chunk size {})",
            report.files_total,
            input_directory.display(),
            settings.workers.max(1),
            settings.chunk_size
        );
        self.progress.on_file_progress(0, report.files_total);

        let loader = Arc::new(BulkLoader::new(settings.chunk_size, report.files_total));
        let workers = settings.workers.max(1);
        let run_cancel = self.cancel.child_token();
        let mut pending = files.into_iter();
        let mut tasks = JoinSet::new();

        loop {
            while tasks.len() < workers && !run_cancel.is_cancelled() {
                let Some(file) = pending.next() else {
                    break;
                };
                let loader = Arc::clone(&loader);
                let sink = Arc::clone(&sink);
                let progress = Arc::clone(&self.progress);
                let cancel = run_cancel.clone();
                tasks.spawn(async move {
                    loader
                        .import_file(&file.path, sink.as_ref(), progress.as_ref(), &cancel)
                        .await
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Import task failed: {e}");
                    report.errors.push(format!("Import task failed: {e}"));
                    self.stop(&mut report, RunStatus::Aborted, &run_cancel);
                    continue;
                }
            };

            match result {
                Ok(file) => {
                    report.files_imported += 1;
                    report.rows_imported += file.rows;
                }
                Err(ImportError::Cancelled) => {
                    self.stop(&mut report, RunStatus::Cancelled, &run_cancel);
                }
                Err(e) => {
                    let skip = matches!(e, ImportError::Parse { .. })
                        && settings.on_parse_error == ParseErrorPolicy::SkipFile;

                    report.errors.push(e.to_string());
                    report.failed_files.push(FailedFile {
                        path: e.path().cloned().unwrap_or_default(),
                        line: match &e {
                            ImportError::Parse { line, .. } => Some(*line),
                            _ => None,
                        },
                        error: e.to_string(),
                    });

                    if skip {
                        warn!("Skipping file: {e}");
                        loader.mark_file_skipped(self.progress.as_ref());
                    } else {
                        error!("Stopping import: {e}");
                        self.stop(&mut report, RunStatus::Aborted, &run_cancel);
                    }
                }
            }
        }

        if report.status == RunStatus::Completed && self.cancel.is_cancelled() {
            report.status = RunStatus::Cancelled;
        }
        report.duration = start_time.elapsed();

        info!(
            "Import {:?}: {} of {} files, {} rows in {:?} ({:.2} rows/sec), {} failed",
            report.status,
            report.files_imported,
            report.files_total,
            report.rows_imported,
            report.duration,
            report.rows_per_second(),
            report.failed_files.len()
        );

        Ok(report)
    }

    /// Generate, merge, then import. Stops at the first failing stage.
    pub async fn run_all<S>(&self, sink: Arc<S>) -> Result<RunReport, PipelineError>
    where
        S: BulkSink + 'static,
    {
        self.progress.on_log("Generating files");
        let generate = self.generate().await?;

        self.progress.on_log("Merging files");
        let merge = self.merge().await?;

        self.progress.on_log("Importing files");
        let import = self.import(sink).await?;

        Ok(RunReport {
            generate,
            merge,
            import,
        })
    }

    /// Record the first terminal status and stop scheduling work.
    fn stop(&self, report: &mut ImportReport, status: RunStatus, run_cancel: &CancellationToken) {
        if report.status == RunStatus::Completed {
            report.status = status;
        }
        run_cancel.cancel();
    }
}
