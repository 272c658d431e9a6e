//! CLI argument definitions for the merge stage.

use crate::MergeJob;
use clap::Args;
use std::path::PathBuf;

/// Merge-stage arguments. Set flags override the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct MergeArgs {
    /// Directory containing the File_<n>.txt inputs
    #[arg(long, short = 'i')]
    pub input_dir: Option<PathBuf>,

    /// Path of the merged output file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Drop every line containing this substring (empty = keep all lines)
    #[arg(long)]
    pub filter: Option<String>,
}

impl MergeArgs {
    /// Overlay the flags that were given onto `job`.
    pub fn apply_to(&self, job: &mut MergeJob) {
        if let Some(dir) = &self.input_dir {
            job.input_directory = Some(dir.clone());
        }
        if let Some(output) = &self.output {
            job.output_path = output.clone();
        }
        if let Some(filter) = &self.filter {
            job.filter_substring = filter.clone();
        }
    }
}
