//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("phonebook").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("phonebook").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--in-memory"));
}

#[test]
fn test_serve_rejects_bad_bind_address() {
    let mut cmd = Command::cargo_bin("phonebook").unwrap();
    cmd.arg("serve").arg("--bind").arg("not-an-address");

    cmd.assert().failure();
}

#[test]
fn test_check_help() {
    let mut cmd = Command::cargo_bin("phonebook").unwrap();
    cmd.arg("check").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage: phonebook check"));
}
