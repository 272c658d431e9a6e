//! Sink abstraction for datafile-pipeline.
//!
//! - [`BulkSink`] - chunked, all-or-nothing bulk insertion of records
//! - [`ProcedureSink`] - named remote procedures with an optional result row
//! - [`MemorySink`] - in-memory implementation of both, with failure injection

mod error;
pub mod memory;
mod procedure;
mod traits;

pub use error::{BoxError, SinkError};
pub use memory::{MemoryHandle, MemorySink, ROW_STATS_PROCEDURE, TRUNCATE_PROCEDURE};
pub use procedure::{ProcedureRow, ProcedureValue};
pub use traits::{BulkSink, ProcedureSink};
