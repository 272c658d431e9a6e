//! Pipeline configuration file.
//!
//! ```toml
//! [generate]
//! output_directory = "GeneratedFiles"
//! file_count = 100
//! lines_per_file = 100000
//! seed = 42
//!
//! [merge]
//! output_path = "Merged_file.txt"
//! filter_substring = "abc"
//!
//! [import]
//! chunk_size = 1000
//! workers = 1
//! on_parse_error = "skip-file"
//! ```
//!
//! Every section and key is optional; missing values take the defaults.
//! The merge and import stages read `generate.output_directory` unless
//! their own `input_directory` is set.

use anyhow::Context;
use clap::ValueEnum;
use line_merge::MergeJob;
use populate_files::GenerationJob;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rows per sink chunk notification.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// What happens when a line of an input file cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorPolicy {
    /// Record the failed file and continue with the next one
    #[default]
    SkipFile,
    /// Stop the whole import
    AbortRun,
}

/// Import stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Directory containing the File_<n>.txt inputs; the generate output
    /// directory when unset
    pub input_directory: Option<PathBuf>,
    /// Rows between progress notifications from the sink
    pub chunk_size: usize,
    /// Files imported concurrently
    pub workers: usize,
    pub on_parse_error: ParseErrorPolicy,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            input_directory: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: 1,
            on_parse_error: ParseErrorPolicy::default(),
        }
    }
}

/// Settings of all three stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub generate: GenerationJob,
    pub merge: MergeJob,
    pub import: ImportSettings,
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config file {path:?}"))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The merge job, reading the generated files unless its input
    /// directory is set.
    pub fn merge_job(&self) -> MergeJob {
        let mut job = self.merge.clone();
        if job.input_directory.is_none() {
            job.input_directory = Some(self.generate.output_directory.clone());
        }
        job
    }

    /// Directory the import stage reads.
    pub fn import_directory(&self) -> PathBuf {
        self.import
            .input_directory
            .clone()
            .unwrap_or_else(|| self.generate.output_directory.clone())
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
