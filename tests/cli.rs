//! Command-line contract: flags, exit codes and where messages go.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn importer() -> Command {
    let mut cmd = cargo_bin_cmd!("mio-resource-importer");
    cmd.env_remove("MIO_URL")
        .env_remove("MIO_USERNAME")
        .env_remove("MIO_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ── help and version ─────────────────────────────────────────────────

#[test]
fn help_lists_flags_and_exits_zero() {
    importer()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--skip-validation"));
}

#[test]
fn lowercase_v_prints_version() {
    importer()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ── failures exit 1 with the message on stdout ──────────────────────

#[test]
fn missing_csv_path_exits_one() {
    importer()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing CSV path"));
}

#[test]
fn missing_csv_file_exits_one() {
    importer()
        .arg("/definitely/not/here.csv")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("CSV file not found"));
}

#[test]
fn unknown_flag_exits_one_and_reports_on_stdout() {
    importer()
        .arg("--bogus")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--bogus"));
}

#[test]
fn missing_credentials_without_terminal_exits_one() {
    let file = csv_file("Type,Ref\nstorage,S1\n");
    importer()
        .arg(file.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("no terminal is attached"));
}

// ── verbose ──────────────────────────────────────────────────────────

#[test]
fn uppercase_v_is_verbose_even_with_rust_log() {
    let file = csv_file("Type,Ref,Protocol\nstorage,S1,s3\n");
    importer()
        .env("RUST_LOG", "warn")
        .args(["-V", "-d", "-u", "http://127.0.0.1:9", "-U", "admin", "-P", "pw"])
        .arg(file.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry-run payloads"))
        .stdout(predicate::str::contains("Would create storage 'S1'"))
        .stdout(predicate::str::contains("Import completed successfully"));
}

#[test]
fn without_verbose_payloads_stay_hidden() {
    let file = csv_file("Type,Ref\nstorage,S1\n");
    importer()
        .args(["-d", "-u", "http://127.0.0.1:9", "-U", "admin", "-P", "pw"])
        .arg(file.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry-run payloads").not());
}
