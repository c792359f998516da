//! Integration tests for CLI argument handling
//!
//! Runs the built binary for paths that need no network: help output,
//! configuration errors, and cache invalidation.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the CLI with given args and a controlled environment
fn run_cli(args: &[&str], access_key: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ratecache"));
    command
        .args(args)
        .env_remove("ACCESS_KEY")
        .env_remove("RATECACHE_DIR")
        .env_remove("RATECACHE_TTL");
    if let Some(key) = access_key {
        command.env("ACCESS_KEY", key);
    }
    command.output().expect("Failed to execute ratecache")
}

fn write_entry(dir: &Path, name: &str) {
    fs::write(
        dir.join(name),
        r#"{"timestamp":0,"base":"EUR","rates":{"BOB":7.5,"SEK":11.2}}"#,
    )
    .unwrap();
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"], None);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ratecache"), "Help should mention ratecache");
    assert!(stdout.contains("get"), "Help should list the get command");
    assert!(stdout.contains("clear"), "Help should list the clear command");
}

#[test]
fn test_missing_access_key_is_reported() {
    let output = run_cli(&["get", "USD"], None);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ACCESS_KEY"), "stderr was: {}", stderr);
}

#[test]
fn test_invalid_ttl_prints_error_and_exits() {
    let output = run_cli(&["get", "USD", "--ttl", "later"], Some("key"));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid TTL"), "stderr was: {}", stderr);
}

#[test]
fn test_clear_removes_cached_entry() {
    let dir = TempDir::new().unwrap();
    write_entry(dir.path(), "EUR-BOB,SEK.json");

    let cache_dir = dir.path().to_str().unwrap();
    let output = run_cli(&["clear", "sek", "bob", "--cache-dir", cache_dir], Some("key"));

    assert!(
        output.status.success(),
        "stderr was: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(!dir.path().join("EUR-BOB,SEK.json").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("EUR-BOB,SEK"), "stdout was: {}", stdout);
}

#[test]
fn test_clear_without_entry_fails() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().to_str().unwrap();

    let output = run_cli(&["clear", "USD", "--cache-dir", cache_dir], Some("key"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No cache entry"), "stderr was: {}", stderr);
}

#[test]
fn test_get_serves_fresh_entry_without_network() {
    let dir = TempDir::new().unwrap();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    fs::write(
        dir.path().join("EUR-USD.json"),
        format!(r#"{{"timestamp":{},"base":"EUR","rates":{{"USD":1.1}}}}"#, now),
    )
    .unwrap();

    let cache_dir = dir.path().to_str().unwrap();
    let output = run_cli(
        &["get", "usd", "--ttl", "1h", "--cache-dir", cache_dir],
        Some("key"),
    );

    assert!(
        output.status.success(),
        "stderr was: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cached"));
    assert!(stdout.contains("USD\t1.1"));
}
