//! Scenario: `mrm config-hash`
//!
//! # Invariants under test
//!
//! 1. Built-in defaults hash to a 64-char hex digest followed by canonical JSON.
//! 2. An overlay changes the hash; an empty overlay does not.
//! 3. An overlay with an unknown key is rejected.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn hash_of(args: &[&str]) -> String {
    let out = Command::cargo_bin("mrm")
        .unwrap()
        .env("RUST_LOG", "warn")
        .arg("config-hash")
        .args(args)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let first = stdout.lines().next().unwrap().to_string();
    first.strip_prefix("config_hash=").unwrap().to_string()
}

#[test]
fn overlays_change_the_hash() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.yaml");
    let tighter = dir.path().join("tighter.yaml");
    fs::write(&empty, "").unwrap();
    fs::write(&tighter, "thresholds:\n  single_day_drop_pct: 4.0\n").unwrap();

    let base = hash_of(&[]);
    assert_eq!(base.len(), 64);
    assert!(base.chars().all(|c| c.is_ascii_hexdigit()));

    assert_eq!(hash_of(&[empty.to_str().unwrap()]), base);
    assert_ne!(hash_of(&[tighter.to_str().unwrap()]), base);
}

#[test]
fn unknown_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "thresholds:\n  single_day_drop: 4.0\n").unwrap();

    Command::cargo_bin("mrm")
        .unwrap()
        .args(["config-hash", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tracker schema"));
}
