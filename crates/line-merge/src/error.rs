//! Error types for the line merger.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while merging.
///
/// Every variant carries the number of lines dropped before the failure;
/// output written up to that point is left in place.
#[derive(Error, Debug)]
pub enum MergeError {
    /// An input could not be read or the output could not be written.
    #[error("IO error on '{}' after {lines_dropped} dropped lines: {source}", path.display())]
    Io {
        path: PathBuf,
        lines_dropped: u64,
        #[source]
        source: std::io::Error,
    },

    /// The merge was cancelled.
    #[error("Merge cancelled after {lines_dropped} dropped lines")]
    Cancelled { lines_dropped: u64 },
}

impl MergeError {
    /// Lines dropped by the filter before the merge stopped.
    pub fn lines_dropped(&self) -> u64 {
        match self {
            MergeError::Io { lines_dropped, .. } | MergeError::Cancelled { lines_dropped } => {
                *lines_dropped
            }
        }
    }
}
