use std::path::PathBuf;

use supas_census::{run, DocumentInput, FilterCriteria, RunContext};
use supas_io::columns::EXPORT_COLUMNS;
use supas_io::xlsx::XlsxOptions;
use supas_io::{export, load_documents, ExportFormat, IoError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../census/tests/fixtures")
}

#[test]
fn loads_every_matching_file_in_order() {
    let docs = load_documents(&fixtures_dir(), "supas_extraction*.json").unwrap();
    let sources: Vec<_> = docs.iter().map(|d| d.source().to_string()).collect();
    assert_eq!(
        sources,
        vec!["supas_extraction_1.json", "supas_extraction_2.json", "supas_extraction_3.json"]
    );
    assert!(matches!(docs[0], DocumentInput::Parsed(_)));
    assert!(matches!(docs[2], DocumentInput::Failed { .. }));
}

#[test]
fn missing_directory_has_no_documents() {
    let err = load_documents(&fixtures_dir().join("nope"), "supas_extraction*.json").unwrap_err();
    assert!(matches!(err, IoError::NoDocuments { .. }));
}

#[test]
fn load_run_and_export_csv() {
    let docs = load_documents(&fixtures_dir(), "supas_extraction*.json").unwrap();
    let output = run(docs, &mut RunContext::default()).unwrap();
    let rows = output.table.filter(&FilterCriteria {
        region: Some("Papua".into()),
        ..Default::default()
    });
    assert_eq!(rows.len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("papua.csv");
    let written = export(&rows, &path, ExportFormat::Csv, &XlsxOptions::default()).unwrap();
    assert_eq!(written, 4);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), EXPORT_COLUMNS.len());
    let names: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(12).unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Maria Wenda", "Yohanes Kogoya", "Ruth Kogoya", "Daniel Kogoya"]);
}

#[test]
fn load_run_and_export_xlsx() {
    let docs = load_documents(&fixtures_dir(), "supas_extraction*.json").unwrap();
    let output = run(docs, &mut RunContext::default()).unwrap();
    let rows = output.table.filter(&FilterCriteria::default());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.xlsx");
    let written = export(&rows, &path, ExportFormat::Xlsx, &XlsxOptions::default()).unwrap();
    assert_eq!(written, 5);
    assert!(std::fs::metadata(&path).unwrap().len() > 100);
}
