//! Terminal progress bars for the CLI.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pipeline_core::ProgressSink;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const FILES_TEMPLATE: &str =
    "{prefix:>5} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";
const ROWS_TEMPLATE: &str = "{prefix:>5} [{elapsed_precise}] [{wide_bar:.green}] {pos}/{len} {msg}";

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// A files bar for the stage and one rows bar per file in flight.
///
/// A rows bar appears with the first update of a file and is removed when
/// that file's progress is reset to zero.
pub struct BarProgress {
    multi: MultiProgress,
    files: ProgressBar,
    rows: Mutex<HashMap<PathBuf, ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::with_target(MultiProgress::new())
    }

    /// Bars that draw nowhere.
    pub fn hidden() -> Self {
        Self::with_target(MultiProgress::with_draw_target(
            indicatif::ProgressDrawTarget::hidden(),
        ))
    }

    fn with_target(multi: MultiProgress) -> Self {
        let files = multi.add(ProgressBar::new(0));
        files.set_style(bar_style(FILES_TEMPLATE));
        files.set_prefix("Files");

        Self {
            multi,
            files,
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Clear the bars once a stage is done.
    pub fn finish(&self) {
        if let Ok(mut rows) = self.rows.lock() {
            for (_, bar) in rows.drain() {
                bar.finish_and_clear();
            }
        }
        self.files.finish();
    }

    pub fn files_position(&self) -> (u64, Option<u64>) {
        (self.files.position(), self.files.length())
    }

    /// Position of the rows bar of `file`, if the file is in flight.
    pub fn rows_position(&self, file: &Path) -> Option<(u64, Option<u64>)> {
        let rows = self.rows.lock().ok()?;
        rows.get(file).map(|bar| (bar.position(), bar.length()))
    }

    pub fn files_in_flight(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    fn rows_bar(&self, file: &Path, total: u64) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(bar_style(ROWS_TEMPLATE));
        bar.set_prefix("Rows");
        let name = file.file_name().unwrap_or(file.as_os_str());
        bar.set_message(name.to_string_lossy().into_owned());
        bar
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarProgress {
    fn on_file_progress(&self, current: u64, total: u64) {
        self.files.set_length(total);
        self.files.set_position(current);
    }

    fn on_row_progress(&self, file: &Path, current: u64, total: u64) {
        let Ok(mut rows) = self.rows.lock() else {
            return;
        };

        if current == 0 {
            if let Some(bar) = rows.remove(file) {
                bar.finish_and_clear();
                self.multi.remove(&bar);
                return;
            }
        }

        match rows.get(file) {
            Some(bar) => {
                bar.set_length(total);
                bar.set_position(current);
            }
            None => {
                let bar = self.rows_bar(file, total);
                bar.set_position(current);
                rows.insert(file.to_path_buf(), bar);
            }
        }
    }

    fn on_log(&self, message: &str) {
        self.files.set_message(message.to_string());
    }
}
