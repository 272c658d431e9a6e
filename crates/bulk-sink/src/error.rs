//! Error types for sinks.

use thiserror::Error;

/// Boxed cause carried by [`SinkError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`crate::BulkSink`] and [`crate::ProcedureSink`].
#[derive(Error, Debug)]
pub enum SinkError {
    /// No handle could be opened.
    #[error("Failed to connect to sink: {0}")]
    Connect(#[source] BoxError),

    /// A bulk write failed; nothing from it is committed.
    #[error("Bulk write failed after {rows_sent} rows were sent: {source}")]
    Write {
        rows_sent: u64,
        #[source]
        source: BoxError,
    },

    /// A remote procedure failed or does not exist.
    #[error("Procedure '{name}' failed: {source}")]
    Procedure {
        name: String,
        #[source]
        source: BoxError,
    },
}

impl SinkError {
    pub fn connect(source: impl Into<BoxError>) -> Self {
        SinkError::Connect(source.into())
    }

    pub fn write(rows_sent: u64, source: impl Into<BoxError>) -> Self {
        SinkError::Write {
            rows_sent,
            source: source.into(),
        }
    }

    pub fn procedure(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SinkError::Procedure {
            name: name.into(),
            source: source.into(),
        }
    }
}
