//! datafile-pipeline library
//!
//! Generates large synthetic delimited-text datasets, merges them with
//! line-level filtering, and bulk-loads them into PostgreSQL, reporting
//! progress throughout.
//!
//! # Stages
//!
//! - generate - `populate_files::FileSetWriter` writes `File_<n>.txt`
//! - merge - `line_merge::LineMerger` streams the files into one, dropping
//!   lines that contain a filter substring
//! - import - [`BulkLoader`] parses each file and pushes it through a
//!   `bulk_sink::BulkSink` in chunks
//!
//! [`Pipeline`] drives the stages with one progress sink and one
//! cancellation token.
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate 100 files of 100000 lines
//! datafile-pipeline generate --seed 42
//!
//! # Merge, dropping every line containing "abc"
//! datafile-pipeline merge --filter abc
//!
//! # Import into PostgreSQL
//! datafile-pipeline import --postgresql-connection-string postgresql://...
//!
//! # Call a stored procedure and print its row
//! datafile-pipeline call row_stats --postgresql-connection-string postgresql://...
//! ```

pub mod args;
pub mod config;
mod error;
pub mod import;
pub mod pipeline;
pub mod progress_bars;

pub use args::{ImportArgs, SinkArgs};
pub use config::{ImportSettings, ParseErrorPolicy, PipelineConfig, DEFAULT_CHUNK_SIZE};
pub use error::{ImportError, PipelineError};
pub use import::{read_records, BulkLoader, FileImport};
pub use pipeline::{FailedFile, ImportReport, Pipeline, RunReport, RunStatus};
pub use progress_bars::BarProgress;
