#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Config that starts from an empty board instead of the example one.
pub const UNSEEDED_CONFIG: &str = "[seed]\nenabled = false\n";

pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    /// Data directory with seeding disabled.
    pub fn empty() -> std::io::Result<Self> {
        let board = Self::seeded()?;
        board.write_config(UNSEEDED_CONFIG)?;
        Ok(board)
    }

    /// Data directory with no config; the first command seeds it.
    pub fn seeded() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file("kanban.toml", contents)
    }

    /// Raw `store.json` entries
    pub fn store(&self) -> Result<Value, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.dir.path().join("store.json"))?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = kanban_cmd();
        cmd.env("KANBAN_DIR", self.dir.path());
        cmd
    }

    /// Run with `--json` and return the parsed envelope.
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.cmd().arg("--json").args(args).output()?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

pub fn kanban_cmd() -> Command {
    let mut cmd = Command::cargo_bin("kanban").expect("binary");
    cmd.env_remove("RUST_LOG").env_remove("KANBAN_DIR");
    cmd
}
