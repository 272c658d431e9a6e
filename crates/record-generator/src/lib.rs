//! Synthetic record generator for datafile-pipeline.
//!
//! This crate provides the [`RecordGenerator`] which produces deterministic
//! [`pipeline_core::Record`]s from a caller-supplied random source. The same
//! seed and call sequence always yield the same records.
//!
//! # Architecture
//!
//! ```text
//! GeneratorConfig (alphabets, lengths, ranges, today)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ RecordGenerator  │◄── &mut R: Rng (seeded per file)
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Record { date, latin_text, local_text, even_value, decimal_value }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rand::SeedableRng;
//! use record_generator::{rng_for_index, GeneratorConfig, RecordGenerator};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let generator = RecordGenerator::new(GeneratorConfig::new(today)).unwrap();
//! let mut rng = rng_for_index(42, 1);
//! let record = generator.next(&mut rng);
//! assert_eq!(record.even_value % 2, 0);
//! ```
//!
//! # Generators
//!
//! - `date` - uniform day in `[today - N years, today]`
//! - `text` - fixed-length string sampled with replacement from an [`Alphabet`]
//! - `even` - uniform integer in `[min, max)`, odd draws bumped up by one
//! - `decimal` - uniform float in `[min, max)` with 8 fractional digits

pub mod alphabet;
mod error;
pub mod generator;
pub mod generators;

// Re-exports for convenience
pub use alphabet::Alphabet;
pub use error::GeneratorError;
pub use generator::{rng_for_index, GeneratorConfig, RecordGenerator, RecordIterator};
