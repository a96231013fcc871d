//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers that run inside the test directory
//! - Sample configuration documents

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A valid document with two named environments.
#[allow(dead_code)]
pub const VALID_CONFIG: &str = r#"
name = "shop"
main = "src/index.js"
compatibility_date = "2022-05-01"
kv_namespaces = [{ binding = "CACHE", id = "top" }]

[vars]
MODE = "top"

[env.staging]
route = "staging.example.com/*"
kv_namespaces = [{ binding = "CACHE", id = "staging" }]
vars = { MODE = "staging" }

[env.production]
workers_dev = false
"#;

/// A document with exactly two errors.
#[allow(dead_code)]
pub const INVALID_CONFIG: &str = r#"
name = "shop"
route = "a.example.com/*"
routes = ["b.example.com/*"]

[dev]
port = "8787"
"#;

/// Test environment with an isolated working directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new, empty test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Create a test environment with `worker.toml` holding `contents`.
    pub fn with_config(contents: &str) -> Self {
        let env = Self::new();
        env.write_file("worker.toml", contents);
        env
    }

    /// Get a command builder running in the test directory.
    ///
    /// Configuration environment variables from the outer process are
    /// cleared so discovery always starts from the test directory.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("workercfg").expect("Failed to find workercfg binary");
        cmd.current_dir(&self.temp_path)
            .env_remove("WORKERCFG_CONFIG")
            .env_remove("WORKERCFG_ENV")
            .env_remove("WORKERCFG_LOG_MODE");
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file relative to the test directory, creating parents.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create test directory");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Create a subdirectory in the test environment.
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::create_dir_all(&path).expect("Failed to create test directory");
        path
    }

    /// Run `show --format json` and parse its output.
    ///
    /// # Panics
    /// Panics if the command fails or prints invalid JSON.
    pub fn show_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .arg("show")
            .args(args)
            .output()
            .expect("Failed to run show command");

        assert!(
            output.status.success(),
            "show failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("Output is not valid JSON")
    }
}
