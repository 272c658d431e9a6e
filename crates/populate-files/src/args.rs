//! CLI argument definitions for the generate stage.

use crate::GenerationJob;
use clap::Args;
use std::path::PathBuf;

/// Generate-stage arguments.
///
/// Every flag is optional; set flags override the job loaded from the
/// config file (or its defaults).
#[derive(Args, Clone, Debug, Default)]
pub struct GenerateArgs {
    /// Output directory for the generated files
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Number of files to generate
    #[arg(long)]
    pub file_count: Option<u64>,

    /// Number of lines per file
    #[arg(long)]
    pub lines_per_file: Option<u64>,

    /// Length of the Latin text field
    #[arg(long)]
    pub latin_length: Option<usize>,

    /// Length of the Cyrillic text field
    #[arg(long)]
    pub local_length: Option<usize>,

    /// Upper bound of the even integer field
    #[arg(long)]
    pub even_max: Option<i64>,

    /// Upper bound of the decimal field
    #[arg(long)]
    pub decimal_max: Option<f64>,

    /// Random seed for deterministic generation (same seed = same files)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of files written concurrently
    #[arg(long)]
    pub workers: Option<usize>,
}

impl GenerateArgs {
    /// Overlay the flags that were given onto `job`.
    pub fn apply_to(&self, job: &mut GenerationJob) {
        if let Some(dir) = &self.output_dir {
            job.output_directory = dir.clone();
        }
        if let Some(n) = self.file_count {
            job.file_count = n;
        }
        if let Some(n) = self.lines_per_file {
            job.lines_per_file = n;
        }
        if let Some(n) = self.latin_length {
            job.latin_length = n;
        }
        if let Some(n) = self.local_length {
            job.local_length = n;
        }
        if let Some(max) = self.even_max {
            job.even_upper_bound = max;
        }
        if let Some(max) = self.decimal_max {
            job.decimal_upper_bound = max;
        }
        if self.seed.is_some() {
            job.seed = self.seed;
        }
        if let Some(n) = self.workers {
            job.workers = n;
        }
    }
}
