#![allow(missing_docs, unused_results)]

use std::process::Command;

fn logbook() -> Command {
    Command::new(env!("CARGO_BIN_EXE_logbook"))
}

#[test]
fn prints_version() {
    let out = logbook().arg("--version").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn rejects_unknown_flag() {
    let out = logbook().arg("--no-such-flag").output().unwrap();
    assert!(!out.status.success());
}

#[test]
fn malformed_settings_file_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, "{ not json").unwrap();

    let out = logbook()
        .arg("--settings")
        .arg(&settings)
        .arg("--db-path")
        .arg(dir.path().join("ledger.db"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Failed to load settings"), "stderr: {stderr}");
}

#[test]
fn database_path_that_is_a_directory_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let out = logbook()
        .arg("--settings")
        .arg(dir.path().join("missing.json"))
        .arg("--db-path")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("is a directory"), "stderr: {stderr}");
}
