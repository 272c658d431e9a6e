//! Data file set writer for datafile-pipeline.
//!
//! This crate populates a directory with `File_1.txt` .. `File_<N>.txt`,
//! each holding `lines_per_file` records from the
//! [`record_generator::RecordGenerator`].
//!
//! Files are generated concurrently on the blocking pool. Each file draws
//! from its own rng derived from `(seed, index)`, so the same seed produces
//! byte-identical files no matter how many workers run. A file is written
//! under a `.partial` name and renamed once flushed, so readers only ever see
//! complete files.
//!
//! # Example
//!
//! ```ignore
//! use populate_files::{FileSetWriter, GenerationJob};
//! use pipeline_core::TracingProgress;
//!
//! let job = GenerationJob { file_count: 3, lines_per_file: 10, ..Default::default() };
//! let report = FileSetWriter::new(job)?
//!     .generate(Arc::new(TracingProgress), CancellationToken::new())
//!     .await?;
//! ```

pub mod args;
mod error;
mod job;
mod writer;

pub use args::GenerateArgs;
pub use error::PopulateError;
pub use job::GenerationJob;
pub use writer::{FileSetWriter, GenerateReport, DEFAULT_BUFFER_SIZE};
