// Excel export (xlsx only)
//
// One sheet, header row, one row per member. Source fields are written as
// strings exactly as extracted; derived values are written as numbers.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use supas_census::DerivedRow;

use crate::columns::{cells, Cell, EXPORT_COLUMNS};
use crate::error::IoError;

/// Sheet layout knobs, normally taken from the `[export]` config section.
#[derive(Debug, Clone)]
pub struct XlsxOptions {
    pub sheet_name: String,
    /// Auto-fitted widths are capped at this many characters.
    pub max_column_width: usize,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Data ART".into(),
            max_column_width: 50,
        }
    }
}

/// Export statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExportResult {
    pub rows_exported: usize,
    /// Applied width per column, aligned with [`EXPORT_COLUMNS`].
    pub column_widths: Vec<usize>,
}

/// Write `rows` to a new workbook at `path`.
pub fn export(rows: &[&DerivedRow], path: &Path, options: &XlsxOptions) -> Result<ExportResult, IoError> {
    let fail = |message: String| IoError::Export {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(&options.sheet_name)
        .map_err(|e| fail(format!("Failed to create sheet '{}': {}", options.sheet_name, e)))?;

    let header_format = Format::new().set_bold();
    let mut widths: Vec<usize> = EXPORT_COLUMNS.iter().map(|name| name.chars().count()).collect();

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &header_format)
            .map_err(|e| fail(format!("Failed to write header '{}': {}", name, e)))?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, cell) in cells(row).iter().enumerate() {
            write_cell(worksheet, excel_row, col as u16, cell).map_err(&fail)?;
            widths[col] = widths[col].max(cell.width());
        }
    }

    let column_widths = apply_widths(worksheet, &widths, options.max_column_width).map_err(&fail)?;

    workbook
        .save(path)
        .map_err(|e| fail(format!("Failed to save XLSX file: {}", e)))?;

    log::info!("wrote {} row(s) to {}", rows.len(), path.display());
    Ok(ExportResult {
        rows_exported: rows.len(),
        column_widths,
    })
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), String> {
    match cell {
        Cell::Text(text) => worksheet
            .write_string(row, col, *text)
            .map(|_| ())
            .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e)),
        Cell::Number(n) => worksheet
            .write_number(row, col, *n as f64)
            .map(|_| ())
            .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e)),
        Cell::Empty => Ok(()),
    }
}

/// Width per column is the longest rendered value plus two, capped at `max_width`.
fn fitted_width(longest: usize, max_width: usize) -> usize {
    (longest + 2).min(max_width)
}

fn apply_widths(worksheet: &mut Worksheet, longest: &[usize], max_width: usize) -> Result<Vec<usize>, String> {
    let mut applied = Vec::with_capacity(longest.len());
    for (col, &len) in longest.iter().enumerate() {
        let width = fitted_width(len, max_width);
        worksheet
            .set_column_width(col as u16, width as f64)
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
        applied.push(width);
    }
    Ok(applied)
}
