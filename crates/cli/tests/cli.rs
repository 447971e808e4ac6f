// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the cable binary.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn cable() -> Command {
    cargo_bin_cmd!("cable")
}

#[test]
fn test_help_lists_options() {
    cable()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--channel"))
        .stdout(predicate::str::contains("--origin"))
        .stdout(predicate::str::contains("--perform"));
}

#[test]
fn test_channel_is_required() {
    cable()
        .arg("ws://localhost:3000/cable")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--channel"));
}

#[test]
fn test_rejects_non_websocket_url() {
    cable()
        .args(["http://localhost:3000/cable", "-C", "ChatChannel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with ws:// or wss://"));
}

#[test]
fn test_rejects_malformed_param() {
    cable()
        .args(["ws://localhost:3000/cable", "-C", "ChatChannel", "-p", "room"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_rejects_bad_perform_data() {
    cable()
        .args([
            "ws://localhost:3000/cable",
            "-C",
            "ChatChannel",
            "--perform",
            "speak",
            "--data",
            "[1]",
        ])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    cable()
        .args(["-c"])
        .arg(dir.path().join("missing.toml"))
        .args(["-C", "ChatChannel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}
