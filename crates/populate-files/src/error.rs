//! Error types for the file set writer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while populating the data files.
#[derive(Error, Debug)]
pub enum PopulateError {
    /// A directory or file could not be created or written.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generation parameters are invalid.
    #[error("Generator error: {0}")]
    Generator(#[from] record_generator::GeneratorError),

    /// The run was cancelled before every file was written.
    #[error("Generation cancelled after {files_completed} files")]
    Cancelled { files_completed: u64 },

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    Task(String),
}

impl PopulateError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PopulateError::Io { path, source }
    }
}
