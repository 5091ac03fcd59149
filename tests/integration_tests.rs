mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use common::{create_fake_images, create_test_image, file_names};
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("batch-squeeze").unwrap()
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--ignore-compressed"))
        .stdout(predicate::str::contains("--input"));
}

#[test]
fn test_cli_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_nonexistent_input_exits_with_invalid_input_code() {
    let temp = TempDir::new().unwrap();
    cmd()
        .args(["--input", "definitely-not-here", "--quiet"])
        .arg("--output")
        .arg(temp.path().join("out"))
        .arg("--temp-dir")
        .arg(temp.path().join("tmp"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory not found"));
}

#[test]
fn test_invalid_quality_is_rejected() {
    let temp = TempDir::new().unwrap();
    cmd()
        .arg("--input")
        .arg(temp.path())
        .args(["--quality", "0", "--quiet"])
        .assert()
        .code(1);
}

#[test]
fn test_verbose_and_quiet_conflict() {
    cmd().args(["--verbose", "--quiet"]).assert().failure();
}

#[test]
fn test_empty_directory_finishes() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("images");
    input.create_dir_all().unwrap();
    input.child("notes.txt").write_str("text").unwrap();

    cmd()
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(temp.path().join("out"))
        .arg("--temp-dir")
        .arg(temp.path().join("tmp"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Process Finished"))
        .stdout(predicate::str::contains("Freed Space : 0.00 mb"));

    temp.child("out").assert(predicate::path::is_dir());
    temp.child("tmp").assert(predicate::path::missing());
}

#[test]
fn test_thirty_real_images_end_to_end() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("src");
    input.create_dir_all().unwrap();
    for i in 0..30 {
        create_test_image(input.path(), &format!("photo-{:02}.jpg", i), 64, 48);
    }

    cmd()
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(temp.path().join("dist"))
        .arg("--temp-dir")
        .arg(temp.path().join(".temp"))
        .args(["--jobs", "2", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Process Finished"))
        .stdout(predicate::str::contains("Input Size :"))
        .stdout(predicate::str::contains("Output Size :"));

    let outputs = file_names(&temp.path().join("dist"));
    assert_eq!(outputs.len(), 30);
    assert!(outputs.iter().all(|name| name.starts_with("compressed-photo-")));
    temp.child(".temp").assert(predicate::path::missing());
    input.child("photo-00.jpg").assert(predicate::path::exists());
}

#[test]
fn test_undecodable_files_are_copied_through() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("src");
    input.create_dir_all().unwrap();
    create_fake_images(input.path(), 2, 100);

    cmd()
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(temp.path().join("dist"))
        .arg("--temp-dir")
        .arg(temp.path().join(".temp"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 file(s) could not be compressed"));

    temp.child("dist/compressed-img-00.jpg")
        .assert(predicate::path::is_file());
}

#[test]
fn test_output_containing_input_is_refused() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("images");
    input.create_dir_all().unwrap();
    input.child("keep.jpg").write_binary(&[1, 2, 3]).unwrap();

    cmd()
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(temp.path())
        .arg("--temp-dir")
        .arg(temp.path().join(".temp"))
        .arg("--quiet")
        .assert()
        .code(1);

    input.child("keep.jpg").assert(predicate::path::exists());
}
