//! Progress reporting contract.
//!
//! Every producing stage owns its counters and pushes updates to a
//! [`ProgressSink`]; observers never mutate them. Implementations must
//! return promptly and take care of any thread affinity they need, since
//! the pipeline calls them from whatever task is running the stage.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Observer of pipeline progress.
pub trait ProgressSink: Send + Sync {
    /// `current` of `total` files are done.
    fn on_file_progress(&self, current: u64, total: u64);

    /// `current` of `total` rows of `file` are done.
    ///
    /// Several files can be in flight at once and their updates interleave.
    /// Per file the updates start at zero, rise monotonically, and end with
    /// a reset to zero once the file is finished or has failed.
    fn on_row_progress(&self, file: &Path, current: u64, total: u64);

    /// A human-readable status line.
    fn on_log(&self, message: &str);
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_file_progress(&self, _current: u64, _total: u64) {}

    fn on_row_progress(&self, _file: &Path, _current: u64, _total: u64) {}

    fn on_log(&self, _message: &str) {}
}

/// Forwards updates to `tracing`.
///
/// File progress and log lines go out at `info`, row progress at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_file_progress(&self, current: u64, total: u64) {
        info!("Files: {current} of {total}");
    }

    fn on_row_progress(&self, file: &Path, current: u64, total: u64) {
        debug!("Rows of '{}': {current} of {total}", file.display());
    }

    fn on_log(&self, message: &str) {
        info!("{message}");
    }
}

/// A single progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Files { current: u64, total: u64 },
    Rows {
        file: PathBuf,
        current: u64,
        total: u64,
    },
    Log(String),
}

/// Pushes updates into an unbounded channel.
///
/// Sending never blocks. Updates are dropped silently once the receiver
/// is gone.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create a sink and the receiver the observer reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

impl ProgressSink for ChannelProgress {
    fn on_file_progress(&self, current: u64, total: u64) {
        self.send(ProgressEvent::Files { current, total });
    }

    fn on_row_progress(&self, file: &Path, current: u64, total: u64) {
        self.send(ProgressEvent::Rows {
            file: file.to_path_buf(),
            current,
            total,
        });
    }

    fn on_log(&self, message: &str) {
        self.send(ProgressEvent::Log(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_progress_delivers_in_order() {
        let (progress, mut rx) = ChannelProgress::new();

        progress.on_file_progress(0, 3);
        progress.on_row_progress(Path::new("File_1.txt"), 1000, 2500);
        progress.on_log("hello");

        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Files {
                current: 0,
                total: 3
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Rows {
                file: PathBuf::from("File_1.txt"),
                current: 1000,
                total: 2500
            }
        );
        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::Log("hello".into()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_progress_survives_dropped_receiver() {
        let (progress, rx) = ChannelProgress::new();
        drop(rx);

        progress.on_file_progress(1, 1);
        progress.on_log("nobody is listening");
    }

    #[test]
    fn test_progress_sinks_are_object_safe() {
        let sinks: Vec<Box<dyn ProgressSink>> =
            vec![Box::new(NoopProgress), Box::new(TracingProgress)];
        for sink in &sinks {
            sink.on_file_progress(1, 2);
            sink.on_row_progress(Path::new("File_1.txt"), 3, 4);
            sink.on_log("ok");
        }
    }
}
