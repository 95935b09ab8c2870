//! CLI integration tests for photo-sort.
//!
//! Only the non-interactive paths are exercised here: argument handling,
//! version output and exit codes for bad directories.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn photo_sort() -> Command {
    Command::cargo_bin("photo-sort").unwrap()
}

#[test]
fn version_is_printed() {
    photo_sort()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_options() {
    photo_sort()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--threshold"))
        .stdout(predicate::str::contains("--no-auto-duplicates"))
        .stdout(predicate::str::contains("--no-viewer"))
        .stdout(predicate::str::contains("--reset"));
}

#[test]
fn missing_directory_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let missing = temp.child("nope");

    photo_sort()
        .arg(missing.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Directory does not exist"));

    missing.assert(predicate::path::missing());
}

#[test]
fn file_instead_of_directory_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("photo.jpg");
    file.write_str("A").unwrap();

    photo_sort().arg(file.path()).assert().code(1);
    temp.child(".photosorter").assert(predicate::path::missing());
}

#[test]
fn empty_directory_finishes_cleanly() {
    let temp = TempDir::new().unwrap();

    photo_sort()
        .arg(temp.path())
        .arg("--no-viewer")
        .assert()
        .success()
        .stdout(predicate::str::contains("No photos found"));
}
