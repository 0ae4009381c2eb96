//! `supas export`: write the filtered member table to `.xlsx` or `.csv`.

use std::path::PathBuf;

use serde::Serialize;
use supas_census::FilterCriteria;
use supas_io::filename::export_file_name;
use supas_io::xlsx::XlsxOptions;
use supas_io::ExportFormat;

use crate::{load_session, CliError, InputArgs};

#[derive(Serialize)]
struct ExportOutput {
    path: String,
    format: &'static str,
    rows: usize,
}

pub fn cmd_export(
    input: &InputArgs,
    criteria: FilterCriteria,
    format: ExportFormat,
    output: Option<PathBuf>,
    json: bool,
    fail_on_empty: bool,
) -> Result<(), CliError> {
    let session = load_session(input)?;
    let rows = session.output.table.filter(&criteria);

    if rows.is_empty() {
        if fail_on_empty {
            return Err(CliError::no_matches("no rows match the given criteria; nothing exported"));
        }
        eprintln!("no rows match the given criteria; writing header only");
    }

    let export_config = &session.config.export;
    let path = output.unwrap_or_else(|| {
        let now = chrono::Local::now().naive_local();
        PathBuf::from(export_file_name(&export_config.file_prefix, &criteria, now, format))
    });
    let options = XlsxOptions {
        sheet_name: export_config.sheet_name.clone(),
        max_column_width: export_config.max_column_width,
    };

    let written = supas_io::export(&rows, &path, format, &options).map_err(CliError::io)?;

    if json {
        let out = ExportOutput {
            path: path.display().to_string(),
            format: format.extension(),
            rows: written,
        };
        let json_str = serde_json::to_string_pretty(&out).map_err(|e| {
            CliError::new(crate::exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}"))
        })?;
        println!("{json_str}");
    }

    eprintln!("wrote {} row(s) to {}", written, path.display());
    Ok(())
}
