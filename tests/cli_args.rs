//! Integration tests for CLI argument handling
//!
//! Runs the binary for the paths that never start the terminal UI.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_wxlookup"))
        .args(args)
        .output()
        .expect("Failed to execute wxlookup")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wxlookup"), "Help should mention wxlookup");
    assert!(stdout.contains("assets"), "Help should mention the assets command");
}

#[test]
fn test_assets_help_lists_actions() {
    let output = run_cli(&["assets", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("install"));
    assert!(stdout.contains("get"));
    assert!(stdout.contains("list"));
}

#[test]
fn test_invalid_debounce_is_rejected() {
    let output = run_cli(&["--debounce-ms", "soon"]);
    assert!(!output.status.success(), "Expected a non-number to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value"),
        "Should explain the bad value: {}",
        stderr
    );
}

#[test]
fn test_assets_list_on_empty_cache_dir() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let dir = temp_dir.path().to_string_lossy().into_owned();

    let output = run_cli(&["assets", "list", "--cache-dir", &dir]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_assets_get_before_install_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let dir = temp_dir.path().to_string_lossy().into_owned();

    let output = run_cli(&["assets", "get", "index.html", "--cache-dir", &dir]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("NotInstalled"),
        "Should report the missing cache: {}",
        stderr
    );
}
