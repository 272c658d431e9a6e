//! Streaming merge of data files into one output file.

use crate::error::MergeError;
use pipeline_core::{
    list_data_files, ProgressSink, DEFAULT_MERGED_FILE_NAME, DEFAULT_OUTPUT_DIRECTORY,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Lines copied between cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1000;

const BUFFER_SIZE: usize = 64 * 1024;

/// Inputs, output, and filter of one merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeJob {
    /// Directory of the `File_<n>.txt` inputs; [`DEFAULT_OUTPUT_DIRECTORY`]
    /// when unset
    pub input_directory: Option<PathBuf>,
    pub output_path: PathBuf,
    /// Lines containing this substring are dropped; empty keeps every line
    pub filter_substring: String,
}

impl Default for MergeJob {
    fn default() -> Self {
        Self {
            input_directory: None,
            output_path: PathBuf::from(DEFAULT_MERGED_FILE_NAME),
            filter_substring: String::new(),
        }
    }
}

impl MergeJob {
    /// The input directory, falling back to the default.
    pub fn input_directory(&self) -> PathBuf {
        self.input_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY))
    }
}

/// Summary of a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub files_merged: u64,
    pub lines_written: u64,
    pub lines_dropped: u64,
    pub duration: Duration,
}

/// Streams every `File_<n>.txt` of a directory into one file, dropping
/// lines that contain the filter substring.
///
/// Lines are handled as bytes and kept lines are copied unchanged, line
/// ending included. Only a final line without a newline gets one appended,
/// so it stays separate from the next input. Memory use is bounded by the
/// longest line.
#[derive(Debug, Clone)]
pub struct LineMerger {
    job: MergeJob,
}

impl LineMerger {
    pub fn new(job: MergeJob) -> Self {
        Self { job }
    }

    pub fn job(&self) -> &MergeJob {
        &self.job
    }

    /// Run the merge.
    ///
    /// The output is created or truncated first. Inputs are visited in
    /// index order and lines keep their order within each input. After
    /// each input the running drop count is reported through
    /// [`ProgressSink::on_log`].
    pub fn merge(
        &self,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<MergeReport, MergeError> {
        let start_time = Instant::now();
        let mut state = MergeState::default();

        let input_directory = self.job.input_directory();
        let inputs = list_data_files(&input_directory)
            .map_err(|source| state.io_error(&input_directory, source))?;
        let total = inputs.len() as u64;

        info!(
            "Merging {} files from '{}' into '{}'",
            total,
            input_directory.display(),
            self.job.output_path.display()
        );

        let output = File::create(&self.job.output_path)
            .map_err(|source| state.io_error(&self.job.output_path, source))?;
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, output);

        progress.on_file_progress(0, total);

        for input in &inputs {
            if cancel.is_cancelled() {
                return Err(state.cancelled());
            }

            let dropped_before = state.lines_dropped;
            self.merge_file(&input.path, &mut writer, &mut state, cancel)?;

            state.files_merged += 1;
            debug!(
                "Merged '{}', {} lines dropped",
                input.path.display(),
                state.lines_dropped - dropped_before
            );
            progress.on_file_progress(state.files_merged, total);
            progress.on_log(&format!("{} lines were removed", state.lines_dropped));
        }

        writer
            .flush()
            .map_err(|source| state.io_error(&self.job.output_path, source))?;

        let report = MergeReport {
            output_path: self.job.output_path.clone(),
            files_merged: state.files_merged,
            lines_written: state.lines_written,
            lines_dropped: state.lines_dropped,
            duration: start_time.elapsed(),
        };

        info!(
            "Merge complete: {} files, {} lines written, {} lines removed in {:?}",
            report.files_merged, report.lines_written, report.lines_dropped, report.duration
        );

        Ok(report)
    }

    fn merge_file<W: Write>(
        &self,
        path: &Path,
        writer: &mut W,
        state: &mut MergeState,
        cancel: &CancellationToken,
    ) -> Result<(), MergeError> {
        let file = File::open(path).map_err(|source| state.io_error(path, source))?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let filter = self.job.filter_substring.as_bytes();
        let mut line = Vec::new();
        let mut lines_read = 0u64;

        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| state.io_error(path, source))?;
            if n == 0 {
                return Ok(());
            }

            lines_read += 1;
            if lines_read % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(state.cancelled());
            }

            if !filter.is_empty() && contains(strip_line_ending(&line), filter) {
                state.lines_dropped += 1;
                continue;
            }

            writer
                .write_all(&line)
                .and_then(|_| match line.last() {
                    Some(b'\n') => Ok(()),
                    _ => writer.write_all(b"\n"),
                })
                .map_err(|source| state.io_error(&self.job.output_path, source))?;
            state.lines_written += 1;
        }
    }
}

#[derive(Default)]
struct MergeState {
    files_merged: u64,
    lines_written: u64,
    lines_dropped: u64,
}

impl MergeState {
    fn io_error(&self, path: &Path, source: std::io::Error) -> MergeError {
        MergeError::Io {
            path: path.to_path_buf(),
            lines_dropped: self.lines_dropped,
            source,
        }
    }

    fn cancelled(&self) -> MergeError {
        MergeError::Cancelled {
            lines_dropped: self.lines_dropped,
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::{ChannelProgress, NoopProgress, ProgressEvent};
    use std::fs;
    use tempfile::TempDir;

    fn write_inputs(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn merge_job(dir: &TempDir, filter: &str) -> MergeJob {
        MergeJob {
            input_directory: Some(dir.path().to_path_buf()),
            output_path: dir.path().join("merged.out"),
            filter_substring: filter.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let dir = TempDir::new().unwrap();
        write_inputs(
            dir.path(),
            &[("File_1.txt", "a1\na2\n"), ("File_2.txt", "b1\nb2\nb3\n")],
        );

        let job = merge_job(&dir, "");
        let report = LineMerger::new(job.clone())
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.files_merged, 2);
        assert_eq!(report.lines_written, 5);
        assert_eq!(report.lines_dropped, 0);
        assert_eq!(
            fs::read_to_string(&job.output_path).unwrap(),
            "a1\na2\nb1\nb2\nb3\n"
        );
    }

    #[test]
    fn test_filter_drops_matching_lines() {
        let dir = TempDir::new().unwrap();
        write_inputs(
            dir.path(),
            &[
                ("File_1.txt", "keep\nhas XYZ here\nkeep too\n"),
                ("File_2.txt", "XYZ\nfine\n"),
            ],
        );

        let job = merge_job(&dir, "XYZ");
        let report = LineMerger::new(job.clone())
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.lines_dropped, 2);
        assert_eq!(report.lines_written, 3);
        let merged = fs::read_to_string(&job.output_path).unwrap();
        assert!(!merged.contains("XYZ"));
        assert_eq!(merged, "keep\nkeep too\nfine\n");
    }

    #[test]
    fn test_files_visited_in_index_order_and_others_ignored() {
        let dir = TempDir::new().unwrap();
        write_inputs(
            dir.path(),
            &[
                ("File_10.txt", "ten\n"),
                ("File_2.txt", "two\n"),
                ("File_0.txt", "zero\n"),
                ("notes.txt", "ignored\n"),
                ("File_3.txt.partial", "partial\n"),
            ],
        );

        let job = merge_job(&dir, "");
        let report = LineMerger::new(job.clone())
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.files_merged, 2);
        assert_eq!(fs::read_to_string(&job.output_path).unwrap(), "two\nten\n");
    }

    #[test]
    fn test_missing_trailing_newline_and_crlf_kept() {
        let dir = TempDir::new().unwrap();
        write_inputs(
            dir.path(),
            &[("File_1.txt", "a\r\nb"), ("File_2.txt", "c\n")],
        );

        let job = merge_job(&dir, "");
        LineMerger::new(job.clone())
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap();

        assert_eq!(fs::read_to_string(&job.output_path).unwrap(), "a\r\nb\nc\n");
    }

    #[test]
    fn test_non_utf8_lines_copied_verbatim() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("File_1.txt"),
            b"ok line\nbad \xff byte\nlast\r\n",
        )
        .unwrap();
        fs::write(dir.path().join("File_2.txt"), b"\xfe zzz\nkeep\n").unwrap();

        let job = merge_job(&dir, "zzz");
        let report = LineMerger::new(job.clone())
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.lines_written, 4);
        assert_eq!(report.lines_dropped, 1);
        assert_eq!(
            fs::read(&job.output_path).unwrap(),
            b"ok line\nbad \xff byte\nlast\r\nkeep\n".to_vec()
        );
    }

    #[test]
    fn test_filter_ignores_line_ending() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path(), &[("File_1.txt", "a\r\nb\n")]);

        let report = LineMerger::new(merge_job(&dir, "\r"))
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.lines_dropped, 0);
        assert_eq!(report.lines_written, 2);
    }

    #[test]
    fn test_progress_and_removed_log() {
        let dir = TempDir::new().unwrap();
        write_inputs(
            dir.path(),
            &[("File_1.txt", "x\ny\n"), ("File_2.txt", "x\nz\n")],
        );

        let (sink, mut rx) = ChannelProgress::new();
        LineMerger::new(merge_job(&dir, "x"))
            .merge(&sink, &CancellationToken::new())
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                ProgressEvent::Files { current: 0, total: 2 },
                ProgressEvent::Files { current: 1, total: 2 },
                ProgressEvent::Log("1 lines were removed".to_string()),
                ProgressEvent::Files { current: 2, total: 2 },
                ProgressEvent::Log("2 lines were removed".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_input_directory() {
        let dir = TempDir::new().unwrap();
        let job = MergeJob {
            input_directory: Some(dir.path().join("missing")),
            output_path: dir.path().join("merged.out"),
            filter_substring: String::new(),
        };

        let err = LineMerger::new(job)
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, MergeError::Io { .. }));
        assert_eq!(err.lines_dropped(), 0);
    }

    #[test]
    fn test_unwritable_output() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path(), &[("File_1.txt", "a\n")]);
        let job = MergeJob {
            input_directory: Some(dir.path().to_path_buf()),
            output_path: dir.path().join("no-such-dir").join("merged.out"),
            filter_substring: String::new(),
        };

        let err = LineMerger::new(job.clone())
            .merge(&NoopProgress, &CancellationToken::new())
            .unwrap_err();

        match err {
            MergeError::Io { path, .. } => assert_eq!(path, job.output_path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cancelled_before_first_file() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path(), &[("File_1.txt", "a\n")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = LineMerger::new(merge_job(&dir, ""))
            .merge(&NoopProgress, &cancel)
            .unwrap_err();

        assert!(matches!(err, MergeError::Cancelled { lines_dropped: 0 }));
    }

    #[test]
    fn test_job_from_partial_toml() {
        let job: MergeJob = toml::from_str(r#"filter_substring = "abc""#).unwrap();
        assert_eq!(job.filter_substring, "abc");
        assert_eq!(job.output_path, PathBuf::from("Merged_file.txt"));
        assert_eq!(job.input_directory, None);
        assert_eq!(job.input_directory(), PathBuf::from("GeneratedFiles"));
    }
}
