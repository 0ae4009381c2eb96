use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// Glob pattern could not be compiled.
    InvalidPattern { pattern: String, message: String },
    /// No file in the directory matched the pattern.
    NoDocuments { dir: PathBuf, pattern: String },
    /// Writing an export file failed.
    Export { path: PathBuf, message: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid file pattern '{pattern}': {message}")
            }
            Self::NoDocuments { dir, pattern } => {
                write!(f, "no files matching '{pattern}' in {}", dir.display())
            }
            Self::Export { path, message } => {
                write!(f, "failed to write {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for IoError {}
