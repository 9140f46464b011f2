use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Cursor, Read};
use tempfile::TempDir;

fn payload_cmd() -> Command {
    let mut cmd = Command::cargo_bin("payload").unwrap();
    cmd.env_remove("PAYLOAD_CONFIG").env_remove("PAYLOAD_VERSION");
    cmd
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/scripts")).unwrap();
    fs::write(dir.path().join("src/a.txt"), "hello").unwrap();
    fs::write(dir.path().join("src/b.txt"), "world\n").unwrap();
    fs::write(dir.path().join("src/scripts/run.sh"), "#!/bin/sh\n").unwrap();
    dir
}

#[test]
fn list_prints_sorted_prefixed_names() {
    let dir = fixture();
    payload_cmd()
        .args(["list", "--prefix", "out/", "--input"])
        .arg(dir.path().join("src"))
        .assert()
        .success()
        .stdout("out/a.txt\nout/b.txt\nout/scripts/run.sh\n");
}

#[test]
fn pack_zip_writes_archive_with_manifest() {
    let dir = fixture();
    let output = dir.path().join("payload.zip");
    payload_cmd()
        .args(["pack", "--prefix", "out/", "--version-string", "1.2.3", "--input"])
        .arg(dir.path().join("src"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("4 entries"));

    let mut archive = zip::ZipArchive::new(Cursor::new(fs::read(&output).unwrap())).unwrap();
    let mut manifest = String::new();
    archive
        .by_name("manifest/manifest.json")
        .unwrap()
        .read_to_string(&mut manifest)
        .unwrap();
    assert_eq!(manifest, "{\"contents_path\":\"out/\",\"version\":\"1.2.3\"}\n");

    let mode = archive.by_name("out/scripts/run.sh").unwrap().unix_mode();
    assert_eq!(mode.map(|m| m & 0o777), Some(0o744));
}

#[test]
fn pack_plain_to_stdout() {
    let dir = fixture();
    payload_cmd()
        .args(["pack", "--format", "plain", "--prefix", "out/", "--input"])
        .arg(dir.path().join("src/a.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Plaintext payload: out/"))
        .stdout(predicate::str::contains("File: out/a.txt\nhello\n"));
}

#[test]
fn pack_dir_mirrors_entries() {
    let dir = fixture();
    let out = dir.path().join("tree");
    payload_cmd()
        .args(["pack", "--format", "dir", "--prefix", "out/", "--input"])
        .arg(dir.path().join("src"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(fs::read(out.join("out/b.txt")).unwrap(), b"world\n");
    assert!(out.join("out/scripts/run.sh").is_file());
}

#[test]
fn pack_dir_requires_output() {
    let dir = fixture();
    payload_cmd()
        .args(["pack", "--format", "dir", "--input"])
        .arg(dir.path().join("src"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires --output"));
}

#[test]
fn config_file_sets_prefix_and_format() {
    let dir = fixture();
    let config = dir.path().join("payload.yaml");
    fs::write(&config, "prefix: cfg/\nformat: plain\n").unwrap();
    payload_cmd()
        .args(["pack", "--config"])
        .arg(&config)
        .arg("--file")
        .arg(format!("x.txt={}", dir.path().join("src/a.txt").display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("File: cfg/x.txt\nhello\n"));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = fixture();
    let config = dir.path().join("bad.yaml");
    fs::write(&config, "no_such_field: 1\n").unwrap();
    payload_cmd()
        .args(["list", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load config"));
}

#[cfg(target_os = "linux")]
#[test]
fn plain_write_failure_names_the_operation() {
    let dir = fixture();
    payload_cmd()
        .args(["pack", "--format", "plain", "--output", "/dev/full", "--input"])
        .arg(dir.path().join("src/a.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to write plain payload"));
}
