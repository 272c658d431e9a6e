//! File set writer.

use crate::error::PopulateError;
use crate::job::GenerationJob;
use chrono::Local;
use pipeline_core::{data_file_name, ProgressSink};
use record_generator::{rng_for_index, RecordGenerator};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default buffer size for file writing.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Rows written between cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1000;

/// Extension appended while a file is being written.
const PARTIAL_EXTENSION: &str = "partial";

/// Summary of a generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub output_directory: PathBuf,
    pub files_written: u64,
    pub rows_written: u64,
    pub bytes_written: u64,
    /// Base seed the files were generated from
    pub seed: u64,
    pub duration: Duration,
}

impl GenerateReport {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Writes `File_1.txt` .. `File_<N>.txt` of generated records.
pub struct FileSetWriter {
    job: GenerationJob,
    generator: Arc<RecordGenerator>,
}

impl FileSetWriter {
    /// Create a writer for `job`, anchoring the date window at the job's
    /// `today` or the local date.
    pub fn new(job: GenerationJob) -> Result<Self, PopulateError> {
        let today = job.today.unwrap_or_else(|| Local::now().date_naive());
        let generator = RecordGenerator::new(job.generator_config(today))?;
        Ok(Self {
            job,
            generator: Arc::new(generator),
        })
    }

    pub fn job(&self) -> &GenerationJob {
        &self.job
    }

    /// Generate every file of the job.
    ///
    /// Files are written by up to `workers` blocking tasks at once. The first
    /// failure cancels the remaining work and is returned once in-flight
    /// tasks have wound down; files completed before it stay in place.
    pub async fn generate(
        &self,
        progress: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> Result<GenerateReport, PopulateError> {
        let start_time = Instant::now();
        let directory = self.job.output_directory.clone();
        let total = self.job.file_count;
        let workers = self.job.workers.max(1);
        let seed = self.job.seed.unwrap_or_else(rand::random);

        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(PopulateError::io(&directory))?;

        info!(
            "Generating {} files with {} lines each in '{}' (seed {}, {} workers)",
            total,
            self.job.lines_per_file,
            directory.display(),
            seed,
            workers
        );
        progress.on_file_progress(0, total);

        let worker_cancel = cancel.child_token();
        let mut tasks = JoinSet::new();
        let mut next_index = 1u64;
        let mut report = GenerateReport {
            output_directory: directory.clone(),
            seed,
            ..Default::default()
        };
        let mut first_error: Option<PopulateError> = None;

        loop {
            while first_error.is_none()
                && !worker_cancel.is_cancelled()
                && tasks.len() < workers
                && next_index <= total
            {
                let task = FileTask {
                    generator: Arc::clone(&self.generator),
                    directory: directory.clone(),
                    index: next_index,
                    lines: self.job.lines_per_file,
                    seed,
                    cancel: worker_cancel.clone(),
                };
                tasks.spawn_blocking(move || task.run());
                next_index += 1;
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            let result = joined.unwrap_or_else(|e| Err(PopulateError::Task(e.to_string())));
            match result {
                Ok(written) => {
                    report.files_written += 1;
                    report.rows_written += written.rows;
                    report.bytes_written += written.bytes;
                    progress.on_file_progress(report.files_written, total);
                }
                Err(e) => {
                    if first_error.is_none() {
                        if !matches!(e, PopulateError::Cancelled { .. }) {
                            warn!("File generation failed: {e}");
                        }
                        worker_cancel.cancel();
                        first_error = Some(e);
                    }
                }
            }
        }

        report.duration = start_time.elapsed();

        match first_error {
            Some(PopulateError::Cancelled { .. }) => Err(PopulateError::Cancelled {
                files_completed: report.files_written,
            }),
            Some(e) => Err(e),
            None if report.files_written < total => Err(PopulateError::Cancelled {
                files_completed: report.files_written,
            }),
            None => {
                info!(
                    "Generation complete: {} files, {} rows, {} bytes in {:?} ({:.2} rows/sec)",
                    report.files_written,
                    report.rows_written,
                    report.bytes_written,
                    report.duration,
                    report.rows_per_second()
                );
                Ok(report)
            }
        }
    }
}

struct WrittenFile {
    rows: u64,
    bytes: u64,
}

/// One file's worth of work, run on the blocking pool.
struct FileTask {
    generator: Arc<RecordGenerator>,
    directory: PathBuf,
    index: u64,
    lines: u64,
    seed: u64,
    cancel: CancellationToken,
}

impl FileTask {
    fn run(self) -> Result<WrittenFile, PopulateError> {
        let final_path = self.directory.join(data_file_name(self.index));
        let partial_path = partial_path_for(&final_path);

        let written = match self.write_partial(&partial_path) {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&partial_path) {
                    debug!(
                        "Could not remove '{}': {remove_err}",
                        partial_path.display()
                    );
                }
                return Err(e);
            }
        };

        fs::rename(&partial_path, &final_path).map_err(PopulateError::io(&final_path))?;
        debug!("Wrote {} rows to '{}'", written.rows, final_path.display());
        Ok(written)
    }

    fn write_partial(&self, path: &Path) -> Result<WrittenFile, PopulateError> {
        let file = File::create(path).map_err(PopulateError::io(path))?;
        let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut rng = rng_for_index(self.seed, self.index);
        let mut rows = 0u64;

        for record in self.generator.records(&mut rng, self.lines) {
            if rows % CANCEL_CHECK_INTERVAL == 0 && self.cancel.is_cancelled() {
                return Err(PopulateError::Cancelled { files_completed: 0 });
            }
            writeln!(writer, "{record}").map_err(PopulateError::io(path))?;
            rows += 1;
        }

        let file = writer
            .into_inner()
            .map_err(|e| PopulateError::Io {
                path: path.to_path_buf(),
                source: e.into_error(),
            })?;
        file.sync_all().map_err(PopulateError::io(path))?;
        let bytes = file.metadata().map_err(PopulateError::io(path))?.len();

        Ok(WrittenFile { rows, bytes })
    }
}

/// `File_3.txt` -> `File_3.txt.partial`
fn partial_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_EXTENSION);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pipeline_core::{list_data_files, parse_line, ChannelProgress, NoopProgress, ProgressEvent};
    use tempfile::TempDir;

    fn test_job(dir: &Path, file_count: u64, lines_per_file: u64) -> GenerationJob {
        GenerationJob {
            output_directory: dir.to_path_buf(),
            file_count,
            lines_per_file,
            seed: Some(42),
            workers: 2,
            today: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generates_exact_file_set() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let writer = FileSetWriter::new(test_job(&out, 3, 10)).unwrap();

        let report = writer
            .generate(Arc::new(NoopProgress), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.files_written, 3);
        assert_eq!(report.rows_written, 30);

        let files = list_data_files(&out).unwrap();
        let indices: Vec<u64> = files.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);

        let mut total_bytes = 0;
        for file in &files {
            let content = fs::read_to_string(&file.path).unwrap();
            total_bytes += content.len() as u64;
            let lines: Vec<&str> = content.lines().collect();
            assert_eq!(lines.len(), 10);
            for line in lines {
                assert_eq!(line.split("||").count(), 5);
                let record = parse_line(line).unwrap();
                assert_eq!(record.even_value % 2, 0);
            }
        }
        assert_eq!(report.bytes_written, total_bytes);

        // No temporary files left behind.
        let entries = fs::read_dir(&out).unwrap().count();
        assert_eq!(entries, 3);
    }

    #[tokio::test]
    async fn test_same_seed_same_files() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();

        let mut job_b = test_job(dir_b.path(), 4, 25);
        job_b.workers = 1;

        FileSetWriter::new(test_job(dir_a.path(), 4, 25))
            .unwrap()
            .generate(Arc::new(NoopProgress), CancellationToken::new())
            .await
            .unwrap();
        FileSetWriter::new(job_b)
            .unwrap()
            .generate(Arc::new(NoopProgress), CancellationToken::new())
            .await
            .unwrap();

        for index in 1..=4 {
            let name = data_file_name(index);
            let a = fs::read(dir_a.path().join(&name)).unwrap();
            let b = fs::read(dir_b.path().join(&name)).unwrap();
            assert_eq!(a, b, "{name} differs");
        }
    }

    #[tokio::test]
    async fn test_file_progress_reaches_total() {
        let temp_dir = TempDir::new().unwrap();
        let (sink, mut rx) = ChannelProgress::new();
        let writer = FileSetWriter::new(test_job(temp_dir.path(), 5, 3)).unwrap();

        writer
            .generate(Arc::new(sink), CancellationToken::new())
            .await
            .unwrap();

        let mut file_updates = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ProgressEvent::Files { current, total } = event {
                assert_eq!(total, 5);
                file_updates.push(current);
            }
        }
        assert_eq!(file_updates, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FileSetWriter::new(test_job(temp_dir.path(), 3, 10)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = writer
            .generate(Arc::new(NoopProgress), cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PopulateError::Cancelled { files_completed: 0 }
        ));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let writer = FileSetWriter::new(test_job(&blocker.join("out"), 1, 1)).unwrap();
        let err = writer
            .generate(Arc::new(NoopProgress), CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            PopulateError::Io { path, .. } => assert_eq!(path, blocker.join("out")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let job = GenerationJob {
            even_lower_bound: 5,
            even_upper_bound: 5,
            ..Default::default()
        };
        assert!(matches!(
            FileSetWriter::new(job),
            Err(PopulateError::Generator(_))
        ));
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path_for(Path::new("/tmp/File_3.txt")),
            PathBuf::from("/tmp/File_3.txt.partial")
        );
    }
}
