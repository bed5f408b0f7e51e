//! Test environment builder for isolated copier testing.
//!
//! Provides `TestEnv` - an isolated working directory plus an isolated home,
//! with helpers to run the copier CLI against them. The home isolation keeps
//! the default cache and config locations out of the real user's directories.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running a copier CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse every stdout line as a JSON object (NDJSON mode)
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .unwrap_or_else(|e| panic!("stdout line is not JSON: {:?} ({})", l, e))
            })
            .collect()
    }
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    /// Working directory the CLI runs in; fixture trees live here
    pub work_dir: TempDir,
    /// Temporary directory standing in for HOME
    pub home_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work temp dir"),
            home_dir: TempDir::new().expect("Failed to create home temp dir"),
        }
    }

    /// Path relative to the working directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.work_dir.path().join(relative)
    }

    /// Cache file used by tests that pass `--cache-file` explicitly
    pub fn cache_file(&self) -> PathBuf {
        self.path("test-cache.json")
    }

    /// Write a file under the working directory, creating parents
    pub fn write_file(&self, relative: &str, bytes: &[u8]) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, bytes).expect("Failed to write file");
    }

    /// Read a file under the working directory
    pub fn read_file(&self, relative: &str) -> Vec<u8> {
        let full_path = self.path(relative);
        std::fs::read(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    /// Write the user config file inside the isolated home
    pub fn write_user_config(&self, toml: &str) {
        let config_path = self.home_dir.path().join(".config/copier/config.toml");
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create config directory");
        }
        std::fs::write(&config_path, toml).expect("Failed to write config.toml");
    }

    /// Run the copier CLI in this environment
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run the copier CLI with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_copier"));
        cmd.current_dir(self.work_dir.path())
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("USERPROFILE", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("XDG_CACHE_HOME", self.home_dir.path().join(".cache"))
            .env_remove("COPIER_BLOCK_SIZE")
            .env_remove("COPIER_VERIFY")
            .env_remove("COPIER_CACHE")
            .env_remove("COPIER_CACHE_FILE")
            .env_remove("COPIER_VERBOSITY");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute copier");
        output_to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// List all files in a directory recursively (for debugging)
pub fn list_all_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                for sub in list_all_files(&path) {
                    files.push(sub);
                }
            } else {
                files.push(path.display().to_string());
            }
        }
    }
    files
}
