//! Golden tests for verifying JSON output format stability
//!
//! These tests ensure that the JSON output format remains stable across
//! releases, since scripts parse it.
//!
//! Run with: `cargo test --features golden`

#![cfg(feature = "golden")]

use std::process::Command;

/// Get the path to the ul binary
fn ul_binary() -> String {
    // Use cargo to build and get the binary path
    let output = Command::new("cargo")
        .args(["build", "--release", "-p", "uplink-cli"])
        .output()
        .expect("Failed to build ul binary");

    if !output.status.success() {
        panic!(
            "Failed to build ul binary: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    // Return path to binary
    env!("CARGO_MANIFEST_DIR").to_string() + "/../../target/release/ul"
}

mod alias_tests {
    use super::*;
    use tempfile::TempDir;

    /// Set up a temporary config directory for isolated testing
    fn setup_test_env() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[test]
    fn test_alias_list_empty_json() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = Command::new(ul_binary())
            .args(["alias", "list", "--json"])
            .env("UL_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute ul");

        assert!(output.status.success(), "Command should succeed");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        // Verify structure matches the documented schema
        insta::assert_json_snapshot!("alias_list_empty", json);
    }

    #[test]
    fn test_alias_set_then_list_json() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = Command::new(ul_binary())
            .args([
                "alias",
                "set",
                "play",
                "https://upload.example.com",
                "--token",
                "secret",
                "--json",
            ])
            .env("UL_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute ul");

        assert!(output.status.success(), "Command should succeed");

        let output = Command::new(ul_binary())
            .args(["alias", "list", "--json"])
            .env("UL_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute ul");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        insta::assert_json_snapshot!("alias_list_one", json);
    }

    #[test]
    fn test_alias_remove_missing_fails() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = Command::new(ul_binary())
            .args(["alias", "remove", "missing", "--json"])
            .env("UL_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute ul");

        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(3));
    }
}
