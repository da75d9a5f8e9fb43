#![allow(dead_code)]

use assert_cmd::Command;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Isolated working directory with its own config file.
pub struct TestContext {
    root: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("storyrun.toml")
    }

    /// Command running in the context directory against the context config.
    pub fn cli(&self) -> Command {
        let mut cmd =
            Command::cargo_bin("storyrun-cli").expect("Failed to locate storyrun-cli binary");
        cmd.current_dir(self.path())
            .arg("--config")
            .arg(self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn write_config(&self, body: &str) {
        fs::write(self.config_path(), body).expect("write config");
    }

    /// Config that drives `sh` as the interpreter so scripts are shell files.
    pub fn use_shell_interpreter(&self) {
        self.write_config(
            r#"[launcher]
interpreter = "sh"
version_args = ["-c", "true"]
pause_on_exit = "never"
"#,
        );
    }

    pub fn write(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, body).expect("write file");
        path
    }

    /// Writes `relative` with its name as content and an mtime `offset_secs` after a fixed base.
    pub fn touch_at(&self, relative: &str, offset_secs: u64) -> PathBuf {
        let path = self.write(relative, relative);
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        File::options()
            .write(true)
            .open(&path)
            .expect("open file")
            .set_modified(base + Duration::from_secs(offset_secs))
            .expect("set mtime");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).expect("read file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path().join(relative).exists()
    }
}
