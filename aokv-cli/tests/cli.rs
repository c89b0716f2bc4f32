//! End-to-end CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.aokv");

    Command::cargo_bin("aokv")
        .unwrap()
        .args(["set", path.to_str().unwrap(), "greeting", "\"hello\""])
        .assert()
        .success();

    Command::cargo_bin("aokv")
        .unwrap()
        .args(["get", path.to_str().unwrap(), "greeting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello"));
}

#[test]
fn remove_writes_null_tombstone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.aokv");

    Command::cargo_bin("aokv")
        .unwrap()
        .args(["set", path.to_str().unwrap(), "k", "1"])
        .assert()
        .success();

    Command::cargo_bin("aokv")
        .unwrap()
        .args(["remove", path.to_str().unwrap(), "k"])
        .assert()
        .success();

    Command::cargo_bin("aokv")
        .unwrap()
        .args(["get", path.to_str().unwrap(), "k"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));
}

#[test]
fn keys_lists_in_first_occurrence_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.aokv");

    for (key, value) in [("b", "1"), ("a", "2"), ("b", "3")] {
        Command::cargo_bin("aokv")
            .unwrap()
            .args(["set", path.to_str().unwrap(), key, value])
            .assert()
            .success();
    }

    let output = Command::cargo_bin("aokv")
        .unwrap()
        .args(["keys", path.to_str().unwrap()])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["b", "a"]);
}
