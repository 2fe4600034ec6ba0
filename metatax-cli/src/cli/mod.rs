pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "metatax",
    version,
    about = "Taxonomic annotation helpers for metagenomics pipelines",
    long_about = "metatax extracts taxonomic annotations from BLAST results, attaches \
                  lineages from a taxadb taxonomy database to BLAST hits, and splits \
                  multi-FASTA files into balanced chunks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to $METATAX_HOME/config.toml)
    #[arg(long, global = true, value_name = "FILE", env = "METATAX_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract taxonomic annotations from BLAST results
    Annotate(commands::annotate::AnnotateArgs),

    /// Attach taxadb lineages to the accessions of a BLAST output
    Lineage(commands::lineage::LineageArgs),

    /// Split a multi-FASTA file by record count or by size
    Split(commands::split::SplitArgs),
}

/// clap value parser accepting only existing files
pub fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("'{}' is not an existing file", s))
    }
}

/// clap value parser accepting only existing directories
pub fn existing_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("'{}' is not an existing directory", s))
    }
}

/// clap value parser for a strictly positive, finite size in gigabytes
pub fn positive_gigabytes(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("'{}' must be a positive number of gigabytes", s))
    }
}
