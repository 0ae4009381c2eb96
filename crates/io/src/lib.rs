// File I/O operations

pub mod columns;
pub mod csv;
pub mod error;
pub mod filename;
pub mod loader;
pub mod xlsx;

use std::path::Path;

use supas_census::DerivedRow;

pub use error::IoError;
pub use loader::{discover, load_documents, read_document};

/// Output file formats for the member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// Write `rows` to `path` in the given format. Returns the number of data rows written.
pub fn export(
    rows: &[&DerivedRow],
    path: &Path,
    format: ExportFormat,
    options: &xlsx::XlsxOptions,
) -> Result<usize, IoError> {
    match format {
        ExportFormat::Xlsx => xlsx::export(rows, path, options).map(|result| result.rows_exported),
        ExportFormat::Csv => csv::export(rows, path),
    }
}
