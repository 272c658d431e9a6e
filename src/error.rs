//! Error types for the import stage and the pipeline driver.

use bulk_sink::SinkError;
use line_merge::MergeError;
use pipeline_core::ParseError;
use populate_files::PopulateError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while importing one file.
#[derive(Error, Debug)]
pub enum ImportError {
    /// An input could not be listed or read.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed; nothing from the file was sent.
    #[error("Parse error in '{}' at line {line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        /// 1-based line number
        line: u64,
        #[source]
        source: ParseError,
    },

    /// The sink refused the connection or the write.
    #[error("Sink error while importing '{}': {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: SinkError,
    },

    /// The import was cancelled.
    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    /// Path of the file the error relates to.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ImportError::Io { path, .. }
            | ImportError::Parse { path, .. }
            | ImportError::Sink { path, .. } => Some(path),
            ImportError::Cancelled => None,
        }
    }
}

/// Errors returned by [`crate::Pipeline`] stages.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Generate stage failed: {0}")]
    Generate(#[from] PopulateError),

    #[error("Merge stage failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Import stage failed: {0}")]
    Import(#[from] ImportError),

    /// A stage task panicked or was aborted.
    #[error("Stage task failed: {0}")]
    Task(String),
}
