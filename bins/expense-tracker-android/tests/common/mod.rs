//! Shared helpers for the expense-tracker-android CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The project's real build descriptor
pub const FIXTURE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../crates/android/testdata/expense_tracker.build.gradle.kts"
));

/// Isolated working directory and `$HOME` so no user configuration is discovered.
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    pub fn dir(&self) -> &Path {
        self.root.path()
    }

    /// Write `content` at `relative` inside the working directory
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Place the fixture where the default configuration looks for it
    pub fn with_default_descriptor(self) -> Self {
        self.write("android/app/build.gradle.kts", FIXTURE);
        self
    }

    pub fn cli(&self) -> Command {
        let mut cmd =
            Command::cargo_bin("expense-tracker-android").expect("Failed to locate binary");
        cmd.current_dir(self.dir())
            .env("HOME", self.dir())
            .env("XDG_CONFIG_HOME", self.dir().join("xdg"))
            .env_remove("RUST_LOG")
            .arg("--no-color");
        cmd
    }
}
