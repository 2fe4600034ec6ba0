#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::Path;

pub use metatax_test::fixtures;
pub use metatax_test::{TaxadbFixture, TestEnvironment};

/// `metatax` command isolated from the user's home and progress bars
pub fn metatax_cmd(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("metatax").unwrap();
    cmd.env_remove("METATAX_CONFIG").env_remove("METATAX_LOG");
    for (key, value) in env.env_vars() {
        cmd.env(key, value);
    }
    cmd
}

/// Count sequences in a FASTA file
pub fn count_sequences(path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().filter(|l| l.starts_with('>')).count())
}

/// Tab-separated fields of every line of a text file
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|l| l.split('\t').map(str::to_string).collect())
        .collect())
}
