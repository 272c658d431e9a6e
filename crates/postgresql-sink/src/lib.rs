//! PostgreSQL sink for datafile-pipeline.
//!
//! Implements [`bulk_sink::BulkSink`] with one transaction per file and one
//! multi-row parameterized INSERT per chunk, and [`bulk_sink::ProcedureSink`]
//! with `SELECT * FROM name()` / `CALL name()`.
//!
//! The destination table is expected to exist with the columns
//! `date DATE, latin_text TEXT, local_text TEXT, even_value BIGINT,
//! decimal_value DOUBLE PRECISION`.

pub mod args;
mod sink;
pub mod sql;

pub use args::{PostgreSQLSinkArgs, DEFAULT_TABLE};
pub use sink::{PostgreSQLHandle, PostgreSQLSink};
