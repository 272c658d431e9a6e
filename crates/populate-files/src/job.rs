//! Parameters of one generation run.

use chrono::NaiveDate;
use pipeline_core::DEFAULT_OUTPUT_DIRECTORY;
use record_generator::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to generate and where.
///
/// Every field has a default, so a partial TOML table deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationJob {
    /// Directory the `File_<n>.txt` files are written into
    pub output_directory: PathBuf,
    /// Number of files
    pub file_count: u64,
    /// Records per file
    pub lines_per_file: u64,
    /// Characters in the Latin text field
    pub latin_length: usize,
    /// Characters in the Cyrillic text field
    pub local_length: usize,
    pub even_lower_bound: i64,
    pub even_upper_bound: i64,
    pub decimal_lower_bound: f64,
    pub decimal_upper_bound: f64,
    /// Base seed; a random one is drawn (and logged) when absent
    pub seed: Option<u64>,
    /// Files written concurrently
    pub workers: usize,
    /// End of the date window; the local date when absent
    pub today: Option<NaiveDate>,
}

impl Default for GenerationJob {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            file_count: 100,
            lines_per_file: 100_000,
            latin_length: 10,
            local_length: 10,
            even_lower_bound: 1,
            even_upper_bound: 100_000_000,
            decimal_lower_bound: 1.0,
            decimal_upper_bound: 20.0,
            seed: None,
            workers: default_workers(),
            today: None,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl GenerationJob {
    /// Generator configuration for this job, anchored at `today`.
    pub fn generator_config(&self, today: NaiveDate) -> GeneratorConfig {
        GeneratorConfig::new(today)
            .with_text_lengths(self.latin_length, self.local_length)
            .with_even_range(self.even_lower_bound, self.even_upper_bound)
            .with_decimal_range(self.decimal_lower_bound, self.decimal_upper_bound)
    }
}
