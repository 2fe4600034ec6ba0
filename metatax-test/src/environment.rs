//! Test environment management
//!
//! Isolated scratch directories cleaned up on drop.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with `input/`, `output/` and `home/` directories
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("metatax-test")
            .context("Failed to create temporary directory")?;

        for dir in ["input", "output", "home"] {
            std::fs::create_dir_all(temp_dir.path().join(dir))?;
        }

        Ok(Self { temp_dir })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root().join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("output")
    }

    /// Directory to use as `METATAX_HOME` so tests never read a user config
    pub fn home_dir(&self) -> PathBuf {
        self.root().join("home")
    }

    /// Environment variables isolating a spawned `metatax` process
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("METATAX_HOME", self.home_dir().to_string_lossy().into_owned()),
            ("METATAX_SILENT", "1".to_string()),
        ]
    }

    /// Write a file under `input/` and return its path
    pub fn write_input(&self, name: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.input_dir().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read a file under `output/` as text
    pub fn read_output(&self, name: &str) -> Result<String> {
        let path = self.output_dir().join(name);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Names of the files under `output/`, sorted
    pub fn output_files(&self) -> Result<Vec<String>> {
        let mut names = std::fs::read_dir(self.output_dir())?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}
