// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// The `dine` binary with logging silenced
pub fn dine() -> Command {
    let mut cmd = Command::cargo_bin("dine").expect("dine binary not built");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Write `content` to a `table.toml` inside a fresh temp dir
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("table.toml");
    std::fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

/// Flags for a run short enough to finish in well under a second
pub const QUICK: &[&str] = &[
    "--duration",
    "300ms",
    "--grace",
    "500ms",
    "--think",
    "1ms..5ms",
    "--eat",
    "1ms..5ms",
];
