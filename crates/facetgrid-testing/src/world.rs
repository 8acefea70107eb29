//! TestWorld pattern for declarative integration test setup.
//!
//! Each world is a fresh temp directory holding `rows.json`,
//! `columns.toml` and optionally `config.toml`. Commands run with that
//! directory as their working directory and with `FACETGRID_CONFIG` pointed
//! inside it, so the developer's own config never leaks into a test.

use anyhow::Result;
use assert_cmd::Command;
use facetgrid_types::Row;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::{COLUMNS_TOML, rows_json};

pub const ROWS_FILE: &str = "rows.json";
pub const COLUMNS_FILE: &str = "columns.toml";
pub const CONFIG_FILE: &str = "config.toml";

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use facetgrid_testing::{TestWorld, fixtures};
///
/// let world = TestWorld::new()
///     .with_rows(&fixtures::scenario_rows())
///     .with_sample_columns();
///
/// let result = world.view(&["--sort", "price:asc"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Get the temp directory root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the world.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write an arbitrary file into the world.
    pub fn with_file(self, name: &str, contents: &str) -> Self {
        std::fs::write(self.path(name), contents).expect("Failed to write file");
        self
    }

    /// Write `rows.json`.
    pub fn with_rows(self, rows: &[Row]) -> Self {
        let json = rows_json(rows);
        self.with_file(ROWS_FILE, &json)
    }

    /// Write `columns.toml`.
    pub fn with_columns(self, toml: &str) -> Self {
        self.with_file(COLUMNS_FILE, toml)
    }

    /// Write the sample column set as `columns.toml`.
    pub fn with_sample_columns(self) -> Self {
        self.with_columns(COLUMNS_TOML)
    }

    /// Write `config.toml`; commands pick it up through `FACETGRID_CONFIG`.
    pub fn with_config(self, toml: &str) -> Self {
        self.with_file(CONFIG_FILE, toml)
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// The caller provides the base command (e.g. from
    /// `cargo_bin_cmd!("facetgrid")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.root())
            .env("FACETGRID_CONFIG", self.path(CONFIG_FILE))
            .env_remove("FACETGRID_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the `facetgrid` binary with `args`.
    ///
    /// # Note
    /// Uses `Command::cargo_bin()`, which needs the binary built in the
    /// cargo target directory (cargo test does that for the CLI crate).
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("facetgrid")
            .map_err(|e| anyhow::anyhow!("Failed to find facetgrid binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// `facetgrid view` over the world's rows and columns, JSON output.
    pub fn view(&self, extra: &[&str]) -> Result<CliResult> {
        let mut args = vec![
            "view",
            "--rows",
            ROWS_FILE,
            "--columns",
            COLUMNS_FILE,
            "--format",
            "json",
        ];
        args.extend_from_slice(extra);
        self.run(&args)
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
