//! Common utilities for integration tests

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the `fb` binary.
///
/// Checks the `CARGO_BIN_EXE_fb` environment variable first (set by cargo
/// when using custom target directories), falling back to the standard
/// `cargo_bin()` lookup for local development.
#[allow(deprecated)] // cargo_bin() is deprecated but needed for fallback
pub fn fb_binary() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_fb")
        .map(PathBuf::from)
        .unwrap_or_else(|_| assert_cmd::cargo::cargo_bin("fb"))
}

/// Create a Command for `fb` pointed at a database inside the given temp dir.
///
/// HOME is redirected into the temp dir so log files never land in the real
/// home directory.
#[allow(dead_code)]
pub fn fb_command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(fb_binary());
    cmd.current_dir(temp_dir.path())
        .env("HOME", temp_dir.path())
        .env("FLOWBOARD_DB", temp_dir.path().join("flowboard.db"));
    cmd
}

/// Create a temp dir with an initialized database and one project.
///
/// Returns the temp dir; the project id is always 1 on a fresh database.
#[allow(dead_code)]
pub fn setup_project(name: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    fb_command(&temp_dir).arg("init").assert().success();

    fb_command(&temp_dir)
        .args(["project", "add", "--name", name])
        .assert()
        .success();

    temp_dir
}

/// Add a task to project 1 and return nothing; ids are sequential from 1.
#[allow(dead_code)]
pub fn add_task(temp_dir: &TempDir, title: &str) {
    fb_command(temp_dir)
        .args(["task", "add", "--project", "1", "--title", title])
        .assert()
        .success();
}
