//! Helpers for running the `dropdesk` binary in a throwaway directory.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temp directory to run commands in, initialized on creation.
pub struct DeskWorkspace {
    pub temp_dir: TempDir,
}

impl DeskWorkspace {
    pub fn new() -> Self {
        let workspace = Self::uninitialized();
        workspace.cmd().arg("init").assert().success();
        workspace
    }

    pub fn uninitialized() -> Self {
        Self {
            temp_dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join(".dropdesk")
    }

    /// A command rooted in the workspace with a clean environment.
    pub fn cmd(&self) -> Command {
        let bin = assert_cmd::cargo::cargo_bin!("dropdesk");
        let mut cmd = Command::new(bin.as_os_str());
        cmd.current_dir(self.root())
            .env_remove("DROPDESK_DIR")
            .env_remove("DROPDESK_DB")
            .env_remove("DROPDESK_JSON")
            .env_remove("RUST_LOG")
            .env("HOME", self.root())
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run with `--json` and parse stdout.
    pub fn json<I, S>(&self, args: I) -> serde_json::Value
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .output()
            .expect("run dropdesk");
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
    }
}
