//! Core types for the datafile-pipeline framework.
//!
//! This crate provides the foundational types shared by every pipeline stage:
//!
//! - [`Record`] - one synthetic row with five typed fields
//! - [`parse_line`] - the delimited-line parser, with typed [`ParseError`]s
//! - [`layout`] - file naming (`File_<n>.txt`), separators, and directory listing
//! - [`ProgressSink`] - the observer contract used by generation, merge, and import
//!
//! # Architecture
//!
//! ```text
//! pipeline-core (this crate)
//!    │
//!    ├─── record-generator   (produces Records)
//!    ├─── populate-files     (writes Records to File_<n>.txt)
//!    ├─── line-merge         (streams File_<n>.txt into one output)
//!    ├─── bulk-sink          (accepts batches of Records)
//!    └─── datafile-pipeline  (parses lines and drives the sink)
//! ```
//!
//! # Example
//!
//! ```rust
//! use pipeline_core::{parse_line, Record};
//!
//! let record = parse_line("2024-03-01||AbCdEfGhIj||АбВгДеЖзИк||42||3.14159265").unwrap();
//! assert_eq!(record.even_value, 42);
//! assert_eq!(record.to_string(), "2024-03-01||AbCdEfGhIj||АбВгДеЖзИк||42||3.14159265");
//! ```

pub mod error;
pub mod layout;
pub mod parse;
pub mod progress;
pub mod record;

pub use error::{ParseError, RecordField};
pub use layout::{
    data_file_name, list_data_files, parse_data_file_index, DataFile, DATE_FORMAT,
    DECIMAL_PLACES, DEFAULT_MERGED_FILE_NAME, DEFAULT_OUTPUT_DIRECTORY, FIELD_SEPARATOR,
};
pub use parse::parse_line;
pub use progress::{
    ChannelProgress, NoopProgress, ProgressEvent, ProgressSink, TracingProgress,
};
pub use record::Record;
