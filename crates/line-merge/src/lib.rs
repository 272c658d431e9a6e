//! Streaming merge-with-filter for datafile-pipeline.
//!
//! [`LineMerger`] concatenates every `File_<n>.txt` of a directory into one
//! output file, dropping lines that contain a filter substring and counting
//! them. Inputs are streamed line by line.

pub mod args;
mod error;
mod merger;

pub use args::MergeArgs;
pub use error::MergeError;
pub use merger::{LineMerger, MergeJob, MergeReport};
