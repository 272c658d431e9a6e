//! On-disk layout shared by the generate, merge, and import stages.
//!
//! Data files live in one directory and are named `File_<n>.txt` where `n`
//! is a positive integer. Every line holds one serialized [`crate::Record`].

use std::io;
use std::path::{Path, PathBuf};

/// Separator between the five fields of a line.
pub const FIELD_SEPARATOR: &str = "||";

/// Date format of the first field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fractional digits printed for the decimal field.
pub const DECIMAL_PLACES: usize = 8;

/// Default directory populated by the generate stage.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "GeneratedFiles";

/// Default output file name of the merge stage.
pub const DEFAULT_MERGED_FILE_NAME: &str = "Merged_file.txt";

const FILE_PREFIX: &str = "File_";
const FILE_SUFFIX: &str = ".txt";

/// File name for the data file with the given index.
pub fn data_file_name(index: u64) -> String {
    format!("{FILE_PREFIX}{index}{FILE_SUFFIX}")
}

/// Extract the index from a data file name, if the name matches the pattern.
///
/// Only plain ASCII digits are accepted, so `File_+3.txt` and `File_0.txt`
/// are rejected.
pub fn parse_data_file_index(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(index) => Some(index),
    }
}

/// A data file discovered in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub index: u64,
    pub path: PathBuf,
}

/// List the data files directly inside `dir` (non-recursive).
///
/// Results are sorted by index for consistent ordering; callers must not
/// depend on cross-file order for correctness.
pub fn list_data_files(dir: &Path) -> io::Result<Vec<DataFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(parse_data_file_index) else {
            continue;
        };
        files.push(DataFile {
            index,
            path: entry.path(),
        });
    }

    files.sort_by_key(|f| f.index);

    tracing::debug!(
        "Listed {} data files in directory: {}",
        files.len(),
        dir.display()
    );

    Ok(files)
}
