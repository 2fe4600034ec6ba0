//! Test utilities for the metatax workspace
//!
//! Shared fixtures so that unit tests in the library crates and the CLI
//! integration tests work from the same sample data:
//!
//! - **Test Environment**: isolated input/output directories with automatic cleanup
//! - **Fixtures**: BLAST tabular lines, accession tables and FASTA files
//! - **Taxadb**: a small SQLite taxonomy database in the taxadb layout

pub mod environment;
pub mod fixtures;
pub mod taxadb;

// Re-export commonly used items
pub use environment::TestEnvironment;
pub use taxadb::{create_taxadb, TaxadbFixture, TaxonRow};
