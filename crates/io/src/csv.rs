// CSV export

use std::path::Path;

use supas_census::DerivedRow;

use crate::columns::{cells, EXPORT_COLUMNS};
use crate::error::IoError;

/// Write a header row plus one row per member. Returns the number of data rows.
pub fn export(rows: &[&DerivedRow], path: &Path) -> Result<usize, IoError> {
    let fail = |message: String| IoError::Export {
        path: path.to_path_buf(),
        message,
    };

    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| fail(e.to_string()))?;

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| fail(e.to_string()))?;

    for row in rows {
        let record: Vec<String> = cells(row).iter().map(|cell| cell.render()).collect();
        writer.write_record(&record).map_err(|e| fail(e.to_string()))?;
    }

    writer.flush().map_err(|e| fail(e.to_string()))?;
    log::info!("wrote {} row(s) to {}", rows.len(), path.display());
    Ok(rows.len())
}
