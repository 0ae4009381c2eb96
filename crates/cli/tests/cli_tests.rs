// End-to-end tests for the `supas` binary against the shared census fixtures.
//
// Run with: cargo test -p supas-cli --test cli_tests -- --nocapture

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../census/tests/fixtures")
}

fn supas() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_supas"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("SUPAS_DIR");
    cmd.env_remove("SUPAS_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_with_fixtures(args: &[&str]) -> Output {
    supas()
        .args(args)
        .arg("--dir")
        .arg(fixtures_dir())
        .output()
        .expect("run supas")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{stdout}"))
}

// ===========================================================================
// summary
// ===========================================================================

#[test]
fn summary_json_counts_whole_table() {
    let val = stdout_json(&run_with_fixtures(&["summary", "--json"]));

    assert_eq!(val["summary"]["total_rows"], 5);
    assert_eq!(val["summary"]["found_rows"], 3);
    assert_eq!(val["summary"]["household_heads"], 3);
    assert_eq!(val["summary"]["found_percentage"], 60.0);
    assert_eq!(val["reconcile"]["total_records"], 3);
    assert_eq!(val["reconcile"]["documents_failed"], 1);

    let warnings = val["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("supas_extraction_3.json"));
}

#[test]
fn summary_human_output() {
    let output = run_with_fixtures(&["summary", "--region", "Papua"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total rows:          4"), "stdout: {stdout}");
    assert!(stdout.contains("(75.0%)"), "stdout: {stdout}");
    assert!(stdout.contains("Rows before filter:  5"), "stdout: {stdout}");
    assert!(stdout.contains("  head rows:         2"), "stdout: {stdout}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("read 3 file(s) and merged 3 unique record(s)"), "stderr: {stderr}");
}

#[test]
fn summary_no_matches_is_not_an_error_by_default() {
    let output = run_with_fixtures(&["summary", "--region", "Nowhere"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no rows match"));
}

#[test]
fn summary_fail_on_empty_exits_4() {
    let output = run_with_fixtures(&["summary", "--region", "Nowhere", "--fail-on-empty"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn empty_directory_exits_3_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let output = supas()
        .args(["summary", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: no files matching"), "stderr: {stderr}");
    assert!(stderr.contains("hint:"), "stderr: {stderr}");
}

#[test]
fn only_broken_files_exits_3() {
    let output = run_with_fixtures(&["summary", "--pattern", "supas_extraction_3.json"]);
    assert_eq!(output.status.code(), Some(3));
}

// ===========================================================================
// options
// ===========================================================================

#[test]
fn options_cascade_from_region() {
    let val = stdout_json(&run_with_fixtures(&["options", "--region", "Papua", "--json"]));
    assert_eq!(val["options"]["regions"], serde_json::json!(["Maluku", "Papua"]));
    assert_eq!(val["options"]["sub_regions"], serde_json::json!(["Abepura"]));
    assert_eq!(val["options"]["sub_districts"], serde_json::json!(["Kota Baru", "Vim"]));
    assert_eq!(
        val["options"]["household_heads"],
        serde_json::json!(["Maria Wenda", "Yohanes Kogoya"])
    );
    assert_eq!(val["matching_rows"], 4);
}

// ===========================================================================
// roster
// ===========================================================================

#[test]
fn roster_human_shows_found_members() {
    let output = run_with_fixtures(&["roster", "--head", "Yohanes Kogoya"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Household:  Yohanes Kogoya"));
    assert!(stdout.contains("Location:   Kota Baru, Abepura"));
    assert!(stdout.contains("Ruth Kogoya"));
    assert!(!stdout.contains("Daniel Kogoya"), "not-found members are hidden");
    assert!(stdout.contains("Rp "));
    assert!(stdout.contains("Members found: 2"));
    assert!(stdout.contains("Age range:     48 - 50 years"));
}

#[test]
fn roster_json_is_deterministic() {
    let first = stdout_json(&run_with_fixtures(&["roster", "--head", "Yohanes Kogoya", "--json"]));
    let second = stdout_json(&run_with_fixtures(&["roster", "--head", "Yohanes Kogoya", "--json"]));
    assert_eq!(first, second);

    assert_eq!(first["age_range"]["min"], 48);
    assert_eq!(first["age_range"]["max"], 50);
    let members = first["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["nama_anggota_keluarga"], "Yohanes Kogoya");
    assert!(members[0]["gaji_uang"].is_number());
    assert!(members[1]["gaji_uang"].is_null());
    assert!(members[0].get("nomor_urut_bangunan").is_none());
}

#[test]
fn roster_requires_head() {
    let output = run_with_fixtures(&["roster"]);
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// export
// ===========================================================================

#[test]
fn export_csv_to_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.csv");
    let output = supas()
        .args(["export", "--format", "csv", "--json", "--output"])
        .arg(&path)
        .arg("--dir")
        .arg(fixtures_dir())
        .output()
        .unwrap();
    let val = stdout_json(&output);
    assert_eq!(val["rows"], 5);
    assert_eq!(val["format"], "csv");

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("provinsi,kecamatan,desa_kelurahan,nks,"));
    assert_eq!(lines.count(), 5);
}

#[test]
fn export_xlsx_generated_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = supas()
        .current_dir(dir.path())
        .args(["export", "--region", "Papua", "--sub-district", "Kota Baru", "--dir"])
        .arg(fixtures_dir())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("supas_art_data_Papua_Kota_Baru_"), "{names:?}");
    assert!(names[0].ends_with(".xlsx"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("wrote 3 row(s)"));
}

#[test]
fn export_fail_on_empty_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("none.xlsx");
    let output = supas()
        .args(["export", "--head", "Nobody", "--fail-on-empty", "--output"])
        .arg(&path)
        .arg("--dir")
        .arg(fixtures_dir())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(!path.exists());
}

#[test]
fn export_to_missing_directory_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    let output = supas()
        .args(["export", "--format", "csv", "--output"])
        .arg(&path)
        .arg("--dir")
        .arg(fixtures_dir())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
}

// ===========================================================================
// config
// ===========================================================================

#[test]
fn validate_config_accepts_and_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.toml");
    let bad = dir.path().join("bad.toml");
    std::fs::write(&good, "[derive]\nseed = 7\n").unwrap();
    std::fs::write(&bad, "[derive]\nreference_month = 0\n").unwrap();

    let output = supas().arg("validate-config").arg(&good).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("valid:"));

    let output = supas().arg("validate-config").arg(&bad).output().unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("reference_month"));
}

#[test]
fn config_dir_is_relative_to_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    for name in ["supas_extraction_1.json", "supas_extraction_2.json"] {
        std::fs::copy(fixtures_dir().join(name), data.join(name)).unwrap();
    }
    let config = dir.path().join("supas.toml");
    std::fs::write(&config, "[input]\ndir = \"data\"\n").unwrap();

    let output = supas()
        .args(["summary", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    let val = stdout_json(&output);
    assert_eq!(val["summary"]["total_rows"], 5);
    assert_eq!(val["reconcile"]["documents_failed"], 0);
}
