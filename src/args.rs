//! CLI argument definitions for the import stage and sink selection.

use crate::config::{ImportSettings, ParseErrorPolicy};
use clap::Args;
use postgresql_sink::PostgreSQLSinkArgs;
use std::path::PathBuf;

/// Import-stage arguments. Set flags override the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct ImportArgs {
    /// Directory containing the File_<n>.txt inputs
    #[arg(long)]
    pub import_dir: Option<PathBuf>,

    /// Rows between sink progress notifications
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Files imported concurrently
    #[arg(long)]
    pub import_workers: Option<usize>,

    /// What to do with a file containing a malformed line
    #[arg(long, value_enum)]
    pub on_parse_error: Option<ParseErrorPolicy>,
}

impl ImportArgs {
    /// Overlay the flags that were given onto `settings`.
    pub fn apply_to(&self, settings: &mut ImportSettings) {
        if let Some(dir) = &self.import_dir {
            settings.input_directory = Some(dir.clone());
        }
        if let Some(n) = self.chunk_size {
            settings.chunk_size = n;
        }
        if let Some(n) = self.import_workers {
            settings.workers = n;
        }
        if let Some(policy) = self.on_parse_error {
            settings.on_parse_error = policy;
        }
    }
}

/// Destination of the import stage.
#[derive(Args, Clone, Debug)]
pub struct SinkArgs {
    #[command(flatten)]
    pub postgresql: PostgreSQLSinkArgs,

    /// Load into an in-memory sink instead of PostgreSQL
    #[arg(long)]
    pub dry_run: bool,
}
